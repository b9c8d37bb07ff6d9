//! Partition and mask file output.
//!
//! The static/dynamic point files print coordinates in hexadecimal-float
//! notation so that every double round-trips exactly through the text
//! representation; a decimal rendering would need 17 significant digits and
//! still be slower to parse back.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::{voxel_of_point, Voxel};
use crate::error::Result;

use super::scan::ScanSlice;

/// Format a double in C `%a` style: `0x1.<mantissa>p<exp>`, trailing
/// mantissa zeros trimmed, exactly representing the value.
pub fn format_hex_float(v: f64) -> String {
    debug_assert!(v.is_finite());
    if v == 0.0 {
        return if v.is_sign_negative() {
            "-0x0p+0".to_string()
        } else {
            "0x0p+0".to_string()
        };
    }
    let bits = v.to_bits();
    let sign = if bits >> 63 == 1 { "-" } else { "" };
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let mut mantissa = bits & 0x000f_ffff_ffff_ffff;
    let exp;
    if biased == 0 {
        // subnormal: renormalise so the leading digit is 1
        let high_bit = 63 - mantissa.leading_zeros() as i64;
        mantissa = (mantissa << (52 - high_bit)) & 0x000f_ffff_ffff_ffff;
        exp = high_bit - 1074;
    } else {
        exp = biased - 1023;
    }
    let mut frac = String::new();
    if mantissa != 0 {
        let mut digits = format!("{mantissa:013x}");
        while digits.ends_with('0') {
            digits.pop();
        }
        frac = format!(".{digits}");
    }
    format!("{sign}0x1{frac}p{exp:+}")
}

/// Write the aggregated static and dynamic point files.
///
/// Slices are emitted in the order given; a point goes to the dynamic file
/// exactly when its voxel is in the empty set. The reflectance column is
/// written as zero.
pub fn write_partition(
    static_path: &Path,
    dynamic_path: &Path,
    slices: &[ScanSlice],
    empty_voxels: &BTreeSet<Voxel>,
    voxel_size: f64,
) -> Result<()> {
    let mut out_static = BufWriter::new(File::create(static_path)?);
    let mut out_dynamic = BufWriter::new(File::create(dynamic_path)?);
    for slice in slices {
        for p in &slice.points_global {
            let out: &mut BufWriter<File> =
                if empty_voxels.contains(&voxel_of_point(p, voxel_size)) {
                    &mut out_dynamic
                } else {
                    &mut out_static
                };
            writeln!(
                out,
                "{} {} {} 0x0p+0",
                format_hex_float(p.x),
                format_hex_float(p.y),
                format_hex_float(p.z)
            )?;
        }
    }
    out_static.flush()?;
    out_dynamic.flush()?;
    Ok(())
}

/// Write one `scanNNN.mask` file per slice: a `1` line for dynamic points,
/// `0` for static, preserving input point order.
pub fn write_masks(
    maskdir: &Path,
    slices: &[ScanSlice],
    empty_voxels: &BTreeSet<Voxel>,
    voxel_size: f64,
) -> Result<()> {
    std::fs::create_dir_all(maskdir)?;
    for slice in slices {
        let path = maskdir.join(format!("scan{:03}.mask", slice.index));
        let mut out = BufWriter::new(File::create(path)?);
        for p in &slice.points_global {
            if empty_voxels.contains(&voxel_of_point(p, voxel_size)) {
                writeln!(out, "1")?;
            } else {
                writeln!(out, "0")?;
            }
        }
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Point3, Pose};
    use tempfile::TempDir;

    #[test]
    fn test_hex_float_known_values() {
        assert_eq!(format_hex_float(0.0), "0x0p+0");
        assert_eq!(format_hex_float(-0.0), "-0x0p+0");
        assert_eq!(format_hex_float(1.0), "0x1p+0");
        assert_eq!(format_hex_float(0.5), "0x1p-1");
        assert_eq!(format_hex_float(5.0), "0x1.4p+2");
        assert_eq!(format_hex_float(-2.5), "-0x1.4p+1");
        assert_eq!(format_hex_float(0.1), "0x1.999999999999ap-4");
    }

    #[test]
    fn test_hex_float_subnormals() {
        assert_eq!(format_hex_float(f64::MIN_POSITIVE / 2.0), "0x1p-1023");
        assert_eq!(format_hex_float(5e-324), "0x1p-1074");
    }

    fn parse_hex_float(s: &str) -> f64 {
        let (sign, rest) = match s.strip_prefix('-') {
            Some(rest) => (-1.0, rest),
            None => (1.0, s),
        };
        let rest = rest.strip_prefix("0x").unwrap();
        let (mantissa, exp) = rest.split_once('p').unwrap();
        let exp: i32 = exp.parse().unwrap();
        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        let mut value = u64::from_str_radix(int_part, 16).unwrap() as f64;
        for (k, c) in frac_part.chars().enumerate() {
            let digit = c.to_digit(16).unwrap() as f64;
            value += digit * (16.0_f64).powi(-(k as i32 + 1));
        }
        sign * value * (2.0_f64).powi(exp)
    }

    #[test]
    fn test_hex_float_round_trips_exactly() {
        for v in [
            std::f64::consts::PI,
            -std::f64::consts::E,
            1234.5678,
            1e-300,
            -3.7e250,
            0.30000000000000004,
        ] {
            let formatted = format_hex_float(v);
            assert_eq!(parse_hex_float(&formatted), v, "value {v} via {formatted}");
        }
    }

    fn slice_with_points(index: usize, points: Vec<Point3>) -> ScanSlice {
        ScanSlice {
            index,
            pose: Pose::identity(),
            points_local: points.clone(),
            points_global: points,
            reflectance: Vec::new(),
        }
    }

    #[test]
    fn test_partition_and_masks() {
        let tmp = TempDir::new().unwrap();
        let slices = vec![
            slice_with_points(0, vec![Point3::new(5.5, 0.0, 0.0)]),
            slice_with_points(1, vec![Point3::new(3.5, 0.0, 0.0)]),
        ];
        let mut empty = BTreeSet::new();
        empty.insert(Voxel::new(3, 0, 0));

        let static_path = tmp.path().join("scan000.3d");
        let dynamic_path = tmp.path().join("scan001.3d");
        write_partition(&static_path, &dynamic_path, &slices, &empty, 1.0).unwrap();
        let static_out = std::fs::read_to_string(&static_path).unwrap();
        let dynamic_out = std::fs::read_to_string(&dynamic_path).unwrap();
        assert_eq!(static_out, "0x1.6p+2 0x0p+0 0x0p+0 0x0p+0\n");
        assert_eq!(dynamic_out, "0x1.cp+1 0x0p+0 0x0p+0 0x0p+0\n");

        let maskdir = tmp.path().join("masks");
        write_masks(&maskdir, &slices, &empty, 1.0).unwrap();
        assert_eq!(
            std::fs::read_to_string(maskdir.join("scan000.mask")).unwrap(),
            "0\n"
        );
        assert_eq!(
            std::fs::read_to_string(maskdir.join("scan001.mask")).unwrap(),
            "1\n"
        );
    }
}
