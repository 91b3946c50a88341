use super::DataStore;
use crate::error::Result;
use crate::model::{EntityId, MacroData};
use crate::tables::OriginalTable;
use std::fs;
use std::path::{Path, PathBuf};

const ENTITY_DIR: &str = "entities";
const TABLES_FILE: &str = "tables.json";

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entity_path(&self, entity: &EntityId) -> PathBuf {
        self.root
            .join(ENTITY_DIR)
            .join(format!("{}.json", encode_file_stem(entity.as_str())))
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Write through a temp file so a crash never leaves half a blob behind.
    fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl DataStore for FileStore {
    fn load_entity(&self, entity: &EntityId) -> Result<MacroData> {
        let path = self.entity_path(entity);
        if !path.exists() {
            return Ok(MacroData::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_entity(&mut self, entity: &EntityId, data: &MacroData) -> Result<()> {
        let content = serde_json::to_string_pretty(data)?;
        self.write_atomic(&self.entity_path(entity), &content)?;
        tracing::debug!(entity = %entity, "saved entity data");
        Ok(())
    }

    fn list_entities(&self) -> Result<Vec<EntityId>> {
        let dir = self.root.join(ENTITY_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(EntityId::new(decode_file_stem(stem)));
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn load_tables(&self) -> Result<Vec<OriginalTable>> {
        let path = self.root.join(TABLES_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save_tables(&mut self, tables: &[OriginalTable]) -> Result<()> {
        let content = serde_json::to_string_pretty(tables)?;
        self.write_atomic(&self.root.join(TABLES_FILE), &content)
    }
}

// Entity ids come from the host and may hold path separators.
fn encode_file_stem(id: &str) -> String {
    urlencoding::encode(id).into_owned()
}

fn decode_file_stem(stem: &str) -> String {
    match urlencoding::decode(stem) {
        Ok(id) => id.into_owned(),
        Err(_) => stem.to_string(),
    }
}
