//! Pipeline configuration.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How the maximum search range of each ray is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MaxrangeMethod {
    /// Shoot every ray all the way to its return.
    None,
    /// Bound rays by stop planes from local surface normals.
    Normals,
    /// Reserved; selecting it aborts.
    #[value(name = "1nearest")]
    #[serde(rename = "1nearest")]
    OneNearest,
}

impl std::fmt::Display for MaxrangeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MaxrangeMethod::None => "none",
            MaxrangeMethod::Normals => "normals",
            MaxrangeMethod::OneNearest => "1nearest",
        })
    }
}

/// How the neighbourhood for normal estimation is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NormalMethod {
    /// K nearest neighbours; declared but not implemented.
    Knearest,
    /// Radius search; declared but not implemented.
    Range,
    /// All points seen under the angle one voxel subtends at the point.
    Angle,
    /// Like knearest on a global tree; declared but not implemented.
    KnearestGlobal,
    /// Like range on a global tree; declared but not implemented.
    RangeGlobal,
}

impl std::fmt::Display for NormalMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            NormalMethod::Knearest => "knearest",
            NormalMethod::Range => "range",
            NormalMethod::Angle => "angle",
            NormalMethod::KnearestGlobal => "knearest-global",
            NormalMethod::RangeGlobal => "range-global",
        })
    }
}

/// On-disk scan formats the reader recognises.
///
/// Only the ASCII formats ship with a reader; the remaining tags are
/// accepted by the parser and abort at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScanFormat {
    Uos,
    #[value(name = "uos_rgb")]
    UosRgb,
    #[value(name = "uos_frames")]
    UosFrames,
    #[value(name = "riegl_txt")]
    RieglTxt,
    #[value(name = "riegl_rgb")]
    RieglRgb,
    #[value(name = "riegl_bin")]
    RieglBin,
    Ply,
    Xyz,
    Rxp,
}

impl std::fmt::Display for ScanFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ScanFormat::Uos => "uos",
            ScanFormat::UosRgb => "uos_rgb",
            ScanFormat::UosFrames => "uos_frames",
            ScanFormat::RieglTxt => "riegl_txt",
            ScanFormat::RieglRgb => "riegl_rgb",
            ScanFormat::RieglBin => "riegl_bin",
            ScanFormat::Ply => "ply",
            ScanFormat::Xyz => "xyz",
            ScanFormat::Rxp => "rxp",
        })
    }
}

/// Everything the pipeline needs to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory containing `scanNNN` files.
    pub dir: PathBuf,
    /// Input format of the scan files.
    pub format: ScanFormat,
    /// First slice index to load.
    pub start: usize,
    /// Last slice index to load, -1 meaning until the last one present.
    pub end: i64,
    /// Extra margin added to every stop plane.
    pub fuzz: f64,
    /// Edge length of the voxel grid.
    pub voxel_size: f64,
    /// Sliding-window radius in slice indices.
    pub diff: usize,
    /// Skip the half-free voxel refinement.
    pub no_subvoxel_accuracy: bool,
    /// Ray shortening strategy.
    pub maxrange_method: MaxrangeMethod,
    /// Neighbour count for the knearest normal methods.
    pub normal_knearest: usize,
    /// Neighbourhood selection for normal estimation.
    pub normal_method: NormalMethod,
    /// Mask output directory; defaults to `<dir>/pplremover`.
    pub maskdir: Option<PathBuf>,
    /// Directory for the static/dynamic point files.
    pub out_dir: PathBuf,
    /// Parallel worker count.
    pub jobs: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            format: ScanFormat::Uos,
            start: 0,
            end: -1,
            fuzz: 0.0,
            voxel_size: 10.0,
            diff: 0,
            no_subvoxel_accuracy: false,
            maxrange_method: MaxrangeMethod::None,
            normal_knearest: 40,
            normal_method: NormalMethod::Angle,
            maskdir: None,
            out_dir: PathBuf::from("."),
            jobs: 1,
        }
    }
}

impl PipelineConfig {
    /// Validate ranges and parameter combinations before any I/O.
    pub fn validate(&self) -> Result<()> {
        if self.end < -1 {
            return Err(Error::Config(format!(
                "cannot end at negative scan number {}",
                self.end
            )));
        }
        if self.end >= 0 && (self.end as usize) < self.start {
            return Err(Error::Config(format!(
                "end ({}) cannot be smaller than start ({})",
                self.end, self.start
            )));
        }
        if !(self.voxel_size > 0.0) {
            return Err(Error::Config(format!(
                "voxel size must be positive, got {}",
                self.voxel_size
            )));
        }
        if self.jobs == 0 {
            return Err(Error::Config("jobs must be at least 1".into()));
        }
        Ok(())
    }

    /// Circumsphere diameter of one voxel.
    pub fn voxel_diagonal(&self) -> f64 {
        (3.0 * self.voxel_size * self.voxel_size).sqrt()
    }

    /// Directory the mask files go to.
    pub fn mask_dir(&self) -> PathBuf {
        match &self.maskdir {
            Some(dir) => dir.clone(),
            None => self.dir.join("pplremover"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let config = PipelineConfig {
            start: 5,
            end: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_open_ended_range_is_valid() {
        let config = PipelineConfig {
            start: 5,
            end: -1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_end_below_minus_one_is_rejected() {
        let config = PipelineConfig {
            end: -2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_voxel_diagonal() {
        let config = PipelineConfig {
            voxel_size: 1.0,
            ..Default::default()
        };
        assert!((config.voxel_diagonal() - 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mask_dir_default() {
        let config = PipelineConfig {
            dir: PathBuf::from("/data/run1"),
            ..Default::default()
        };
        assert_eq!(config.mask_dir(), PathBuf::from("/data/run1/pplremover"));
    }
}
