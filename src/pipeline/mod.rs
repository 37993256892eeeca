//! The sample-processing pipeline and normalization stage.
//!
//! Per sample: detect which raw simulation output is present, parse it,
//! write the canonical POSCAR, re-read it, compute the SOAP descriptor and
//! store it as `soap.npz` next to the raw data. Across a sample set: load
//! every descriptor, flatten all values and persist the mean and population
//! standard deviation as `norm.npz`. All derived files are overwritten on
//! re-run; any failure aborts the whole run.

pub mod error;

pub use error::Error;

use crate::descriptor::{Soap, SoapParameters};
use crate::io::{RawFormat, aims, lammps, poscar};
use crate::model::structure::Structure;
use ndarray::{Array2, arr0};
use ndarray_npy::{NpzReader, NpzWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Per-sample descriptor archive name, holding one array `desc`.
pub const DESCRIPTOR_FILE: &str = "soap.npz";
/// Per-set normalization archive name, holding scalars `desc_mean` and
/// `desc_std`.
pub const NORM_FILE: &str = "norm.npz";

/// Training subset directory under the dataset root.
pub const TRAINING_SUBDIR: &str = "training";
/// Prediction subset directory under the dataset root.
pub const PREDICTION_SUBDIR: &str = "prediction";

/// Aggregated normalization statistics of a sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormStats {
    pub mean: f64,
    pub std: f64,
}

/// Determines which raw format a sample directory carries.
///
/// Exactly one marker file must be present: zero markers means the sample
/// has no parseable input, two mean the intent is ambiguous. Both are
/// reported instead of silently picking a parser.
pub fn detect_raw_format(sample: &Path) -> Result<RawFormat, Error> {
    let mut found = None;
    for raw in RawFormat::ALL {
        if sample.join(raw.marker()).is_file() {
            if found.is_some() {
                return Err(Error::AmbiguousRawFormat(sample.to_path_buf()));
            }
            found = Some(raw);
        }
    }
    found.ok_or_else(|| Error::NoRawFormat(sample.to_path_buf()))
}

/// Parses the raw structure of a sample in its detected format.
pub fn read_raw_structure(sample: &Path, raw: RawFormat) -> Result<Structure, Error> {
    let path = sample.join(raw.marker());
    let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
    let reader = BufReader::new(file);
    let structure = match raw {
        RawFormat::AimsGeometry => aims::read(reader),
        RawFormat::LammpsData => lammps::read(reader),
    };
    structure.map_err(|e| Error::format(&path, e))
}

/// Runs the full per-sample sequence: detect, convert, compute, persist.
pub fn process_sample(sample: &Path, engine: &Soap) -> Result<(), Error> {
    let raw = detect_raw_format(sample)?;
    let structure = read_raw_structure(sample, raw)?;

    let poscar_path = sample.join(poscar::FILE_NAME);
    let file = File::create(&poscar_path).map_err(|e| Error::io(&poscar_path, e))?;
    let mut writer = BufWriter::new(file);
    poscar::write(&mut writer, &structure).map_err(|e| Error::format(&poscar_path, e))?;
    writer
        .flush()
        .map_err(|e| Error::io(&poscar_path, e))?;

    // The engine consumes the canonical file, not the in-memory structure;
    // the file on disk is the single source of truth for atom ordering.
    let file = File::open(&poscar_path).map_err(|e| Error::io(&poscar_path, e))?;
    let canonical = poscar::read(BufReader::new(file)).map_err(|e| Error::format(&poscar_path, e))?;

    let desc = engine.compute(&canonical)?;
    write_descriptor(sample, &desc)
}

/// Processes every sample in sequence, failing fast on the first error.
pub fn process_samples(samples: &[PathBuf], engine: &Soap) -> Result<(), Error> {
    for sample in samples {
        process_sample(sample, engine)?;
    }
    Ok(())
}

fn write_descriptor(sample: &Path, desc: &Array2<f64>) -> Result<(), Error> {
    let path = sample.join(DESCRIPTOR_FILE);
    let file = File::create(&path).map_err(|e| Error::io(&path, e))?;
    let mut npz = NpzWriter::new(file);
    npz.add_array("desc", desc).map_err(|e| Error::NpzWrite {
        path: path.clone(),
        source: e,
    })?;
    npz.finish().map_err(|e| Error::NpzWrite { path, source: e })?;
    Ok(())
}

/// Loads a previously persisted descriptor array for one sample.
pub fn load_descriptor(sample: &Path) -> Result<Array2<f64>, Error> {
    let path = sample.join(DESCRIPTOR_FILE);
    if !path.is_file() {
        return Err(Error::MissingDescriptor(sample.to_path_buf()));
    }
    let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
    let mut npz = NpzReader::new(file).map_err(|e| Error::NpzRead {
        path: path.clone(),
        source: e,
    })?;
    // The writer stores the entry under the bare array name.
    npz.by_name("desc")
        .map_err(|e| Error::NpzRead { path, source: e })
}

/// Aggregates mean and population standard deviation over every value of
/// every sample's descriptor array, and persists them to `outfile`.
///
/// Pure aggregation: the result is independent of sample order (up to
/// floating-point accumulation noise).
pub fn normalize_descriptors(samples: &[PathBuf], outfile: &Path) -> Result<NormStats, Error> {
    if samples.is_empty() {
        return Err(Error::EmptySampleSet);
    }

    let mut values: Vec<f64> = Vec::new();
    for sample in samples {
        let desc = load_descriptor(sample)?;
        values.extend(desc.iter().copied());
    }

    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count;
    let stats = NormStats {
        mean,
        std: variance.sqrt(),
    };

    let file = File::create(outfile).map_err(|e| Error::io(outfile, e))?;
    let mut npz = NpzWriter::new(file);
    npz.add_array("desc_mean", &arr0(stats.mean))
        .map_err(|e| Error::NpzWrite {
            path: outfile.to_path_buf(),
            source: e,
        })?;
    npz.add_array("desc_std", &arr0(stats.std))
        .map_err(|e| Error::NpzWrite {
            path: outfile.to_path_buf(),
            source: e,
        })?;
    npz.finish().map_err(|e| Error::NpzWrite {
        path: outfile.to_path_buf(),
        source: e,
    })?;

    Ok(stats)
}

/// Lists the sample directories directly inside `set_dir`, sorted by name.
pub fn list_sample_dirs(set_dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let entries = std::fs::read_dir(set_dir).map_err(|e| Error::io(set_dir, e))?;
    let mut samples = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(set_dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            samples.push(path);
        }
    }
    samples.sort();
    Ok(samples)
}

/// Generates descriptors for the training subset and its normalization
/// statistics (`training/norm.npz`).
pub fn generate_training_set(root: &Path, params: &SoapParameters) -> Result<NormStats, Error> {
    let engine = Soap::new(params.clone())?;
    let set_dir = root.join(TRAINING_SUBDIR);
    let samples = list_sample_dirs(&set_dir)?;
    process_samples(&samples, &engine)?;
    normalize_descriptors(&samples, &set_dir.join(NORM_FILE))
}

/// Generates descriptors for the prediction subset; no statistics are
/// produced for this set.
pub fn generate_validation_set(root: &Path, params: &SoapParameters) -> Result<(), Error> {
    let engine = Soap::new(params.clone())?;
    let samples = list_sample_dirs(&root.join(PREDICTION_SUBDIR))?;
    process_samples(&samples, &engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;

    const AIMS_MARKER: &str = "geometry.in.next_step";
    const LAMMPS_MARKER: &str = "lmp.data.relax";

    const AIMS_SAMPLE: &str = "\
lattice_vector 10.0 0.0 0.0
lattice_vector 0.0 10.0 0.0
lattice_vector 0.0 0.0 10.0
atom 5.0 5.0 5.0 C
atom 5.0 5.0 6.1 H
";

    fn make_sample(dir: &Path, marker: &str, body: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(marker), body).unwrap();
    }

    fn small_engine() -> Soap {
        let params = SoapParameters {
            nmax: 2,
            lmax: 2,
            ..SoapParameters::default()
        };
        Soap::new(params).unwrap()
    }

    #[test]
    fn detects_each_marker_exclusively() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dir.path().join("s0001");
        make_sample(&sample, AIMS_MARKER, AIMS_SAMPLE);
        assert_eq!(detect_raw_format(&sample).unwrap(), RawFormat::AimsGeometry);

        fs::write(sample.join(LAMMPS_MARKER), "stub").unwrap();
        assert!(matches!(
            detect_raw_format(&sample),
            Err(Error::AmbiguousRawFormat(_))
        ));
    }

    #[test]
    fn empty_sample_has_no_raw_format() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dir.path().join("s0001");
        fs::create_dir_all(&sample).unwrap();
        assert!(matches!(
            detect_raw_format(&sample),
            Err(Error::NoRawFormat(_))
        ));
    }

    #[test]
    fn process_sample_writes_poscar_and_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dir.path().join("s0001");
        make_sample(&sample, AIMS_MARKER, AIMS_SAMPLE);

        let engine = small_engine();
        process_sample(&sample, &engine).unwrap();

        assert!(sample.join(poscar::FILE_NAME).is_file());
        let desc = load_descriptor(&sample).unwrap();
        assert_eq!(desc.nrows(), 2);
        assert_eq!(desc.ncols(), engine.parameters().n_features());
    }

    #[test]
    fn descriptor_archive_roundtrips_by_entry_name() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dir.path().join("s0001");
        fs::create_dir_all(&sample).unwrap();

        let written = ndarray::arr2(&[[1.5, -2.0], [0.0, 4.25]]);
        write_descriptor(&sample, &written).unwrap();
        let loaded = load_descriptor(&sample).unwrap();
        assert_eq!(loaded, written);
    }

    #[test]
    fn load_descriptor_reports_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        let sample = dir.path().join("s0001");
        fs::create_dir_all(&sample).unwrap();
        assert!(matches!(
            load_descriptor(&sample),
            Err(Error::MissingDescriptor(_))
        ));
    }

    #[test]
    fn normalization_matches_hand_computed_stats() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("s0001");
        let b = dir.path().join("s0002");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        write_descriptor(&a, &ndarray::arr2(&[[1.0, 2.0], [3.0, 4.0]])).unwrap();
        write_descriptor(&b, &ndarray::arr2(&[[5.0, 6.0]])).unwrap();

        let outfile = dir.path().join(NORM_FILE);
        let stats =
            normalize_descriptors(&[a.clone(), b.clone()], &outfile).unwrap();
        assert_relative_eq!(stats.mean, 3.5);
        // Population variance of 1..=6 is 35/12.
        assert_relative_eq!(stats.std, (35.0_f64 / 12.0).sqrt(), epsilon = 1e-12);

        // Aggregation is order independent.
        let reversed = normalize_descriptors(&[b, a], &outfile).unwrap();
        assert_relative_eq!(stats.mean, reversed.mean, epsilon = 1e-12);
        assert_relative_eq!(stats.std, reversed.std, epsilon = 1e-12);
        assert!(outfile.is_file());
    }

    #[test]
    fn normalization_rejects_empty_sample_set() {
        let dir = tempfile::tempdir().unwrap();
        let outfile = dir.path().join(NORM_FILE);
        assert!(matches!(
            normalize_descriptors(&[], &outfile),
            Err(Error::EmptySampleSet)
        ));
        assert!(!outfile.exists());
    }

    const LAMMPS_SAMPLE: &str = "\
LAMMPS data file

2 atoms
2 atom types

0.0 10.0 xlo xhi
0.0 10.0 ylo yhi
0.0 10.0 zlo zhi

Masses

1 12.011
2 1.008

Atoms # atomic

1 1 5.0 5.0 5.0
2 2 5.0 5.0 6.1
";

    #[test]
    fn both_raw_formats_yield_the_same_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let aims = dir.path().join("s0001");
        let lammps = dir.path().join("s0002");
        make_sample(&aims, AIMS_MARKER, AIMS_SAMPLE);
        make_sample(&lammps, LAMMPS_MARKER, LAMMPS_SAMPLE);

        let engine = small_engine();
        process_sample(&aims, &engine).unwrap();
        process_sample(&lammps, &engine).unwrap();

        // Same C + H structure, so identical rows regardless of origin.
        let a = load_descriptor(&aims).unwrap();
        let b = load_descriptor(&lammps).unwrap();
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-10, max_relative = 1e-8);
        }
    }

    #[test]
    fn training_set_run_writes_descriptors_and_statistics() {
        let root = tempfile::tempdir().unwrap();
        let set_dir = root.path().join(TRAINING_SUBDIR);
        make_sample(&set_dir.join("s0001"), AIMS_MARKER, AIMS_SAMPLE);
        make_sample(&set_dir.join("s0002"), LAMMPS_MARKER, LAMMPS_SAMPLE);

        let params = SoapParameters {
            nmax: 2,
            lmax: 2,
            ..SoapParameters::default()
        };
        let stats = generate_training_set(root.path(), &params).unwrap();

        assert!(set_dir.join("s0001").join(DESCRIPTOR_FILE).is_file());
        assert!(set_dir.join("s0002").join(DESCRIPTOR_FILE).is_file());
        assert!(set_dir.join(NORM_FILE).is_file());
        assert!(stats.mean.is_finite());
        assert!(stats.std > 0.0);
    }

    #[test]
    fn validation_set_run_writes_no_statistics() {
        let root = tempfile::tempdir().unwrap();
        let set_dir = root.path().join(PREDICTION_SUBDIR);
        make_sample(&set_dir.join("s0001"), AIMS_MARKER, AIMS_SAMPLE);

        let params = SoapParameters {
            nmax: 2,
            lmax: 2,
            ..SoapParameters::default()
        };
        generate_validation_set(root.path(), &params).unwrap();

        assert!(set_dir.join("s0001").join(DESCRIPTOR_FILE).is_file());
        assert!(!set_dir.join(NORM_FILE).exists());
        assert!(!root.path().join(TRAINING_SUBDIR).exists());
    }

    #[test]
    fn broken_sample_aborts_the_whole_set() {
        let root = tempfile::tempdir().unwrap();
        let set_dir = root.path().join(TRAINING_SUBDIR);
        make_sample(&set_dir.join("s0001"), AIMS_MARKER, AIMS_SAMPLE);
        // Second sample carries no marker at all.
        fs::create_dir_all(set_dir.join("s0002")).unwrap();

        let params = SoapParameters {
            nmax: 2,
            lmax: 2,
            ..SoapParameters::default()
        };
        let err = generate_training_set(root.path(), &params).unwrap_err();
        assert!(matches!(err, Error::NoRawFormat(_)));
        assert!(!set_dir.join(NORM_FILE).exists());
    }

    #[test]
    fn sample_dirs_are_sorted_and_files_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("s0002")).unwrap();
        fs::create_dir_all(dir.path().join("s0001")).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let samples = list_sample_dirs(dir.path()).unwrap();
        assert_eq!(
            samples,
            vec![dir.path().join("s0001"), dir.path().join("s0002")]
        );
    }
}
