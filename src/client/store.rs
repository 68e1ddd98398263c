use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use super::ClientError;

/// Persistent key-value storage for saved form values.
///
/// `load` is the explicit init step and `clear` the explicit teardown.
pub trait KeyValueStore {
    fn load(&mut self) -> Result<HashMap<String, String>, ClientError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove(&mut self, key: &str) -> Result<(), ClientError>;
    fn clear(&mut self) -> Result<(), ClientError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&mut self) -> Result<HashMap<String, String>, ClientError> {
        Ok(self.values.clone())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), ClientError> {
        self.values.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        self.values.clear();
        Ok(())
    }
}

/// Stores values as a flat JSON object, rewritten on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            values: HashMap::new(),
        }
    }

    fn flush(&self) -> Result<(), ClientError> {
        let contents = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&mut self) -> Result<HashMap<String, String>, ClientError> {
        self.values = match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => HashMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(self.values.clone())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ClientError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), ClientError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ClientError> {
        self.values.clear();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
