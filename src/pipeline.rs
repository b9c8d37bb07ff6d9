//! The batch pipeline: load, index, walk, partition.

use std::collections::BTreeSet;
use std::time::Instant;

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::config::{MaxrangeMethod, NormalMethod, PipelineConfig};
use crate::core::voxel_of_point;
use crate::error::{Error, Result};
use crate::grid::{walk_voxels, EmptinessVisitor, OccupancyMap};
use crate::io::{write_masks, write_partition, ScanReader};
use crate::maxrange::normals_maxranges;

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSummary {
    pub slices: usize,
    pub points: usize,
    pub occupied_voxels: usize,
    pub empty_voxels: usize,
    pub static_points: usize,
    pub dynamic_points: usize,
}

/// Run the full static/dynamic partition on a scan directory.
pub fn run(config: &PipelineConfig) -> Result<PipelineSummary> {
    config.validate()?;
    let voxel_diagonal = config.voxel_diagonal();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()?;

    // The range filter must act on scanner-local coordinates: filtering
    // after the transform would move points first and decouple reflectance
    // values from their coordinates.
    let mut reader = ScanReader::new(&config.dir, config.format);
    reader.set_range_filter(voxel_diagonal, -1.0);
    let mut slices = reader.load(config.start, config.end)?;
    if slices.is_empty() {
        return Err(Error::NoScans(config.dir.display().to_string()));
    }
    log::info!(
        "loaded {} slices from {}",
        slices.len(),
        config.dir.display()
    );

    for slice in &mut slices {
        slice.apply_transform();
    }

    let mut occupancy = OccupancyMap::new(config.voxel_size);
    for slice in &slices {
        occupancy.insert_slice(&slice.points_global, slice.index);
    }
    if occupancy.is_empty() {
        return Err(Error::Invariant("no voxel occupied".into()));
    }
    log::info!("occupied voxels: {}", occupancy.len());

    log::info!("compute maxranges");
    let maxranges: Vec<Vec<f64>> = match config.maxrange_method {
        MaxrangeMethod::None => slices
            .iter()
            .map(|s| vec![f64::INFINITY; s.len()])
            .collect(),
        MaxrangeMethod::Normals => {
            if config.normal_method != NormalMethod::Angle {
                return Err(Error::Unimplemented(format!(
                    "normal method {}",
                    config.normal_method
                )));
            }
            pool.install(|| {
                slices
                    .par_iter()
                    .map(|s| normals_maxranges(&s.points_local, voxel_diagonal, config.fuzz))
                    .collect::<Result<Vec<_>>>()
            })?
        }
        MaxrangeMethod::OneNearest => {
            return Err(Error::Unimplemented("maxrange method 1nearest".into()))
        }
    };

    log::info!("walk voxels");
    let started = Instant::now();
    let global_empty = Mutex::new(BTreeSet::new());
    pool.install(|| {
        slices
            .par_iter()
            .zip(maxranges.par_iter())
            .for_each(|(slice, row)| {
                let mut visitor = EmptinessVisitor::new(&occupancy, slice.index, config.diff);
                for (j, p_global) in slice.points_global.iter().enumerate() {
                    let end = if row[j].is_finite() {
                        let local = slice.points_local[j];
                        let factor = row[j] / local.norm();
                        slice.pose.transform.apply(local * factor)
                    } else {
                        *p_global
                    };
                    walk_voxels(&slice.pose.position, &end, config.voxel_size, &mut |v| {
                        visitor.visit(v)
                    });
                }
                // single critical section: merge this slice's batch
                global_empty.lock().extend(visitor.into_empty());
            });
    });
    let empty_voxels = global_empty.into_inner();
    log::info!("took: {:.3} seconds", started.elapsed().as_secs_f64());
    log::info!(
        "number of freed voxels: {} ({}% of occupied voxels)",
        empty_voxels.len(),
        100 * empty_voxels.len() / occupancy.len()
    );

    if !config.no_subvoxel_accuracy {
        return Err(Error::Unimplemented(
            "half-free voxel refinement; pass --no-subvoxel-accuracy".into(),
        ));
    }

    log::info!("write partitioning");
    std::fs::create_dir_all(&config.out_dir)?;
    write_partition(
        &config.out_dir.join("scan000.3d"),
        &config.out_dir.join("scan001.3d"),
        &slices,
        &empty_voxels,
        config.voxel_size,
    )?;

    log::info!("write masks");
    write_masks(&config.mask_dir(), &slices, &empty_voxels, config.voxel_size)?;

    let mut points = 0;
    let mut dynamic_points = 0;
    for slice in &slices {
        for p in &slice.points_global {
            points += 1;
            if empty_voxels.contains(&voxel_of_point(p, config.voxel_size)) {
                dynamic_points += 1;
            }
        }
    }
    Ok(PipelineSummary {
        slices: slices.len(),
        points,
        occupied_voxels: occupancy.len(),
        empty_voxels: empty_voxels.len(),
        static_points: points - dynamic_points,
        dynamic_points,
    })
}
