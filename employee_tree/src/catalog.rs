//! The employee catalog: a flat list of records kept alongside the kd tree that indexes them.
//!
//! The flat list is what gets saved; the tree is rebuilt from it on load.

use crate::data::Employee;
use crate::error::Error;
use crate::io;
use crate::tree::Tree;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    pub data_file: String,
    pub autoload: bool,
    pub nearest_exact: bool,
    pub delete_exact: bool,
}

impl Default for CatalogConfig {

    fn default() -> Self {
        return Self {
            data_file: "employees.txt".to_string(),
            autoload: false,
            nearest_exact: false,
            delete_exact: false,
        }
    }
}

impl CatalogConfig {

    pub fn from_file<P: AsRef<Path>>(filename: P) -> Result<Self, Error> {

        let serialized = std::fs::read_to_string(filename)?;

        let deserialized: Self = serde_yaml::from_str(&serialized)?;

        return Ok(deserialized);
    }

    pub fn to_file<P: AsRef<Path>>(&self, filename: P) -> Result<(), Error> {

        let serialized = serde_yaml::to_string(&self)?;
        let mut file = File::create(filename)?;

        file.write_all(serialized.as_bytes())?;

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<Employee>,
    tree: Tree,
    delete_exact: bool,
}

impl Catalog {

    pub fn new() -> Self {
        return Self::default();
    }

    pub fn from_records(records: Vec<Employee>) -> Self {

        let mut catalog = Self::new();
        catalog.replace(records);

        return catalog;
    }

    pub fn with_config(config: &CatalogConfig) -> Self {

        let mut catalog = Self::new();
        catalog.delete_exact = config.delete_exact;

        return catalog;
    }

    pub fn records(&self) -> &[Employee] {
        return &self.records;
    }

    pub fn tree(&self) -> &Tree {
        return &self.tree;
    }

    pub fn len(&self) -> usize {
        return self.records.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.records.is_empty();
    }

    pub fn add(&mut self, record: Employee) -> Result<(), Error> {

        if self.records.iter().any(|r| r.name == record.name) {
            return Err(Error::DuplicateName(record.name));
        }

        self.records.push(record.clone());
        self.tree.insert(record);

        Ok(())
    }

    ///Drops every listed record called `name` and deletes the name from the tree
    ///
    ///# Returns
    ///
    ///`false` if no listed record had that name
    pub fn remove(&mut self, name: &str) -> bool {

        let before = self.records.len();
        self.records.retain(|r| r.name != name);

        if self.records.len() == before {
            return false;
        }

        let removed = match self.delete_exact {
            true => self.tree.delete_exact(name),
            false => self.tree.delete_by_name(name),
        };

        if !removed {
            warn!("{} was listed but the tree walk did not reach it", name);
        }

        return true;
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {

        io::write_records(&path, &self.records)?;
        info!("Employee data saved to {}", path.as_ref().display());

        Ok(())
    }

    /// Replaces the catalog with the file's records. A file that does not exist leaves an empty
    /// catalog.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {

        let records = match io::read_records(&path) {
            Ok(records) => records,
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Unable to open {} for reading. Using an empty employee list.", path.as_ref().display());
                Vec::new()
            },
            Err(e) => return Err(e),
        };

        info!("Employee data loaded from {}: {} records", path.as_ref().display(), records.len());
        self.replace(records);

        Ok(())
    }

    fn replace(&mut self, records: Vec<Employee>) {

        let mut for_tree = records.clone();
        self.tree = Tree::build(&mut for_tree);
        self.records = records;
    }
}
