//! Opaque stand-ins for the external domain schema.
//!
//! The pipeline never interprets molecular data; it only moves it between
//! files and in-memory objects. These types therefore expose exactly the two
//! operations the pipeline is allowed to use, `from_file` and `to_file`, and
//! keep their contents as uninterpreted text.

use std::fs;
use std::io;
use std::path::Path;

fn name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A molecular structure: atom coordinates and identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Molecule {
    name: String,
    data: String,
}

impl Molecule {
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Imports a molecule from a structure file. The molecule takes its name
    /// from the file stem.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        Ok(Self {
            name: name_from_path(path),
            data,
        })
    }

    /// Exports the molecule to a structure file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, &self.data)
    }
}

/// A force field describing the interactions within a molecular system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForceField {
    data: String,
}

impl ForceField {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            data: fs::read_to_string(path)?,
        })
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, &self.data)
    }
}

/// A minimization trajectory: the sequence of structures visited by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trajectory {
    data: String,
}

impl Trajectory {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            data: fs::read_to_string(path)?,
        })
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn molecule_takes_its_name_from_the_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("water.gro");
        fs::write(&path, "three point water").unwrap();

        let molecule = Molecule::from_file(&path).unwrap();
        assert_eq!(molecule.name(), "water");
    }

    #[test]
    fn molecule_export_preserves_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gro");

        let molecule = Molecule::new("sol", "coordinates");
        molecule.to_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "coordinates");
    }

    #[test]
    fn import_fails_for_missing_file() {
        assert!(Trajectory::from_file("/nonexistent/path.trr").is_err());
        assert!(ForceField::from_file("/nonexistent/path.top").is_err());
    }
}
