//! Scan directory reading.
//!
//! A scan sequence is a directory of `scanNNN.3d` point files with
//! `scanNNN.pose` companions holding the registered pose (position on the
//! first line, Euler angles in degrees on the second). Slices are loaded in
//! ascending index order until the requested end or the first missing file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::config::ScanFormat;
use crate::core::{Point3, Pose};
use crate::error::{Error, Result};

/// One loaded scan slice.
#[derive(Debug, Clone)]
pub struct ScanSlice {
    /// Unique slice index within the sequence.
    pub index: usize,
    /// Registered pose of the scanner.
    pub pose: Pose,
    /// Returns in the scanner-local frame, range filter already applied.
    pub points_local: Vec<Point3>,
    /// Returns in the global frame; filled by [`ScanSlice::apply_transform`].
    pub points_global: Vec<Point3>,
    /// Reflectance per return, or empty when the format carries none.
    pub reflectance: Vec<f64>,
}

impl ScanSlice {
    /// Number of returns in this slice.
    pub fn len(&self) -> usize {
        self.points_local.len()
    }

    /// True when the slice has no returns.
    pub fn is_empty(&self) -> bool {
        self.points_local.is_empty()
    }

    /// Transform the scanner-local points into the global frame.
    pub fn apply_transform(&mut self) {
        self.points_global = self
            .points_local
            .iter()
            .map(|p| self.pose.transform.apply(*p))
            .collect();
    }
}

/// Reads scan slices from a directory.
pub struct ScanReader {
    dir: PathBuf,
    format: ScanFormat,
    range_min: f64,
    range_max: f64,
}

impl ScanReader {
    /// Create a reader for `dir` in the given format. No range filter is
    /// active initially.
    pub fn new(dir: impl Into<PathBuf>, format: ScanFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
            range_min: -1.0,
            range_max: -1.0,
        }
    }

    /// Drop returns closer than `min` or farther than `max` from the
    /// scanner. A negative bound disables that side. The filter operates on
    /// scanner-local coordinates, before any transform.
    pub fn set_range_filter(&mut self, min: f64, max: f64) {
        self.range_min = min;
        self.range_max = max;
    }

    /// Load slices `start..=end`; `end = -1` loads until the first missing
    /// file. Returns the slices in ascending index order.
    pub fn load(&self, start: usize, end: i64) -> Result<Vec<ScanSlice>> {
        match self.format {
            ScanFormat::Uos | ScanFormat::UosRgb | ScanFormat::Xyz => {}
            other => {
                return Err(Error::Unimplemented(format!(
                    "no reader for scan format {other}"
                )))
            }
        }

        let mut slices = Vec::new();
        let mut index = start;
        loop {
            if end >= 0 && index > end as usize {
                break;
            }
            let points_path = self.dir.join(format!("scan{index:03}.3d"));
            if !points_path.is_file() {
                break;
            }
            let pose_path = self.dir.join(format!("scan{index:03}.pose"));
            let pose = read_pose(&pose_path)?;
            let (points_local, reflectance) = self.read_points(&points_path)?;
            log::debug!(
                "loaded slice {} with {} returns",
                index,
                points_local.len()
            );
            slices.push(ScanSlice {
                index,
                pose,
                points_local,
                points_global: Vec::new(),
                reflectance,
            });
            index += 1;
        }
        Ok(slices)
    }

    fn read_points(&self, path: &Path) -> Result<(Vec<Point3>, Vec<f64>)> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut points = Vec::new();
        let mut reflectance = Vec::new();
        let mut has_reflectance: Option<bool> = None;

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let fields: Vec<f64> = trimmed
                .split_whitespace()
                .map(str::parse)
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| {
                    Error::ScanData(format!("{}: line {}: {e}", path.display(), lineno + 1))
                })?;
            let (point, refl) = match (self.format, fields.len()) {
                (ScanFormat::Uos | ScanFormat::Xyz, 3) => {
                    (Point3::new(fields[0], fields[1], fields[2]), None)
                }
                (ScanFormat::Uos | ScanFormat::Xyz, 4) => (
                    Point3::new(fields[0], fields[1], fields[2]),
                    Some(fields[3]),
                ),
                (ScanFormat::UosRgb, n) if n >= 6 => {
                    (Point3::new(fields[0], fields[1], fields[2]), None)
                }
                (_, n) => {
                    return Err(Error::ScanData(format!(
                        "{}: line {}: unexpected column count {n}",
                        path.display(),
                        lineno + 1
                    )))
                }
            };
            match (has_reflectance, refl.is_some()) {
                (None, present) => has_reflectance = Some(present),
                (Some(expected), present) if expected != present => {
                    return Err(Error::ScanData(format!(
                        "{}: xyz and reflectance columns are inconsistent",
                        path.display()
                    )))
                }
                _ => {}
            }

            let r = point.norm();
            if self.range_min >= 0.0 && r < self.range_min {
                continue;
            }
            if self.range_max >= 0.0 && r > self.range_max {
                continue;
            }
            points.push(point);
            if let Some(value) = refl {
                reflectance.push(value);
            }
        }

        if !reflectance.is_empty() && reflectance.len() != points.len() {
            return Err(Error::ScanData(format!(
                "{}: {} points but {} reflectance values",
                path.display(),
                points.len(),
                reflectance.len()
            )));
        }
        Ok((points, reflectance))
    }
}

fn read_pose(path: &Path) -> Result<Pose> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::ScanData(format!("{}: {e}", path.display())))?;
    let values: Vec<f64> = contents
        .split_whitespace()
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| Error::ScanData(format!("{}: {e}", path.display())))?;
    if values.len() < 6 {
        return Err(Error::ScanData(format!(
            "{}: expected 6 pose values, found {}",
            path.display(),
            values.len()
        )));
    }
    let position = Point3::new(values[0], values[1], values[2]);
    let orientation = [
        values[3].to_radians(),
        values[4].to_radians(),
        values[5].to_radians(),
    ];
    Ok(Pose::new(position, orientation))
}
