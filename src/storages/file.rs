use std::collections::HashMap;
use std::fs;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::{error, info};

use super::{SerializableShortLink, ShortLink, Storage};
use crate::config::get_config;
use crate::errors::{QrsuError, Result};

pub struct FileStorage {
    file_path: String,
    cache: Arc<RwLock<HashMap<String, ShortLink>>>,
}

impl FileStorage {
    pub fn new() -> Result<Self> {
        let file_path = get_config().storage.links_file.clone();
        Self::with_path(file_path)
    }

    pub fn with_path(file_path: String) -> Result<Self> {
        let storage = FileStorage {
            file_path,
            cache: Arc::new(RwLock::new(HashMap::new())),
        };

        // 初始化时加载数据到缓存
        let links = storage.load_from_file()?;
        {
            let mut cache_guard = storage.cache.write().unwrap();
            *cache_guard = links;
            info!(
                "FileStorage initialized, {} short links loaded",
                cache_guard.len()
            );
        }

        Ok(storage)
    }

    fn load_from_file(&self) -> Result<HashMap<String, ShortLink>> {
        match fs::read_to_string(&self.file_path) {
            Ok(content) => match serde_json::from_str::<Vec<SerializableShortLink>>(&content) {
                Ok(links) => {
                    let mut map = HashMap::new();
                    for link in links {
                        let link: ShortLink = link.into();
                        map.insert(link.code.clone(), link);
                    }
                    Ok(map)
                }
                Err(e) => {
                    error!("Failed to parse links file {}: {}", self.file_path, e);
                    Err(QrsuError::serialization(format!(
                        "Failed to parse links file: {}",
                        e
                    )))
                }
            },
            Err(_) => {
                info!("Links file not found, creating empty store");
                if let Err(e) = fs::write(&self.file_path, "[]") {
                    error!("Failed to create links file {}: {}", self.file_path, e);
                    return Err(QrsuError::file_operation(format!(
                        "Failed to create links file: {}",
                        e
                    )));
                }
                Ok(HashMap::new())
            }
        }
    }

    fn save_to_file(&self, links: &HashMap<String, ShortLink>) -> Result<()> {
        let links_vec: Vec<SerializableShortLink> =
            links.values().map(SerializableShortLink::from).collect();

        let json = serde_json::to_string_pretty(&links_vec)?;
        fs::write(&self.file_path, json)?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get(&self, code: &str) -> Option<ShortLink> {
        let cache_guard = self.cache.read().unwrap();
        cache_guard.get(code).cloned()
    }

    async fn set(&self, link: ShortLink) -> Result<()> {
        // 无条件写入，重复 code 以后写者为准
        {
            let mut cache_guard = self.cache.write().unwrap();
            cache_guard.insert(link.code.clone(), link);
        }

        let cache_guard = self.cache.read().unwrap();
        self.save_to_file(&cache_guard)?;

        Ok(())
    }

    async fn load_all(&self) -> HashMap<String, ShortLink> {
        let cache_guard = self.cache.read().unwrap();
        cache_guard.clone()
    }

    async fn get_backend_name(&self) -> String {
        "file".to_string()
    }
}
