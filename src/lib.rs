//! # Scansweep: dynamic-object removal for 3D laser scan sequences
//!
//! Given an ordered series of registered LiDAR scans, scansweep partitions
//! every point into *static* (the permanent scene) or *dynamic* (moving
//! objects that only appear in some scans). Space is voxelised, every line
//! of sight is walked through the grid, and a voxel that one scan sees
//! through while another scan has returns in it is marked empty; points in
//! empty voxels are dynamic.
//!
//! ## Data flow
//!
//! ```text
//!  scan directory ──► ScanReader ──► scan slices (local + global frames)
//!                                        │
//!                       ┌────────────────┼───────────────┐
//!                       ▼                ▼               ▼
//!                 OccupancyMap     maxrange table   trajectory poses
//!                       │                │               │
//!                       └───────► walk_voxels ◄──────────┘
//!                                 (EmptinessVisitor)
//!                                        │
//!                                 empty-voxel set
//!                                        │
//!                        static/dynamic partition + masks
//! ```
//!
//! ## Modules
//!
//! - [`core`]: points, poses, voxel lattice arithmetic
//! - [`grid`]: occupancy map, 3D-DDA walker, emptiness visitor
//! - [`maxrange`]: normal-based ray shortening
//! - [`io`]: scan reading, partition and mask output
//! - [`pipeline`]: the batch driver tying everything together

pub mod config;
pub mod core;
pub mod error;
pub mod grid;
pub mod io;
pub mod maxrange;
pub mod pipeline;

pub use config::{MaxrangeMethod, NormalMethod, PipelineConfig, ScanFormat};
pub use error::{Error, Result};
pub use pipeline::{run, PipelineSummary};
