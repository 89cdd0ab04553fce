//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`SettingsPort`] and [`ConfigPort`] for AquaFeed.
//!
//! - **Settings**: the byte-addressed schedule layout (see
//!   [`crate::settings`]) is kept as one [`STORE_LEN`]-byte blob.  The
//!   image is cached in RAM; every byte write that changes it commits the
//!   whole blob, so each accepted entry survives an immediate power cut.
//! - **Config**: [`FirmwareConfig`] as a postcard blob, range-checked
//!   before it is written.
//!
//! A missing blob reads as erased flash (`0xFF`), so the settings loader
//! sees no sentinel and writes defaults.

use crate::app::ports::{ConfigError, ConfigPort, SettingsPort, StorageError};
use crate::config::{self, FirmwareConfig};
use crate::settings::STORE_LEN;
use log::{info, warn};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const NAMESPACE: &str = "aquafeed";
const SETTINGS_KEY: &str = "eeprom";
const CONFIG_KEY: &str = "fwcfg";

const MAX_BLOB_SIZE: usize = 256;

/// Value of a never-written byte.
const ERASED: u8 = 0xFF;

pub struct NvsAdapter {
    image: [u8; STORE_LEN],
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter, initialise NVS flash and load the
    /// settings image.
    ///
    /// Returns `Err(ConfigError::IoError)` if flash initialisation fails
    /// unrecoverably.  A full or outdated partition is erased and
    /// re-initialised automatically.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        let mut adapter = Self::blank();
        adapter.reload_image();
        Ok(adapter)
    }

    fn blank() -> Self {
        Self {
            image: [ERASED; STORE_LEN],
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        }
    }

    /// Settings image as currently cached.
    pub fn image(&self) -> &[u8; STORE_LEN] {
        &self.image
    }

    /// Forget the stored settings so the next boot writes defaults.
    pub fn erase_settings(&mut self) -> Result<(), StorageError> {
        self.image = [ERASED; STORE_LEN];
        self.write_blob(SETTINGS_KEY, &self.image)
    }

    fn reload_image(&mut self) {
        let mut buf = [ERASED; STORE_LEN];
        match self.read_blob(SETTINGS_KEY, &mut buf) {
            Ok(Some(len)) if len == STORE_LEN => {
                info!("NvsAdapter: settings image loaded");
                self.image = buf;
            }
            Ok(Some(len)) => {
                warn!("NvsAdapter: settings image has {} bytes, ignoring", len);
            }
            Ok(None) => info!("NvsAdapter: no settings image yet"),
            Err(e) => warn!("NvsAdapter: settings read failed: {}", e),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_blob(&self, key: &str, buf: &mut [u8]) -> Result<Option<usize>, StorageError> {
        let composite = Self::composite_key(NAMESPACE, key);
        Ok(self.store.borrow().get(&composite).map(|data| {
            let len = data.len().min(buf.len());
            buf[..len].copy_from_slice(&data[..len]);
            data.len()
        }))
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_blob(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let composite = Self::composite_key(NAMESPACE, key);
        self.store.borrow_mut().insert(composite, data.to_vec());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(&self, key: &str, buf: &mut [u8]) -> Result<Option<usize>, StorageError> {
        let key_buf = Self::key_buf(key);
        let result = Self::with_nvs_handle(NAMESPACE, false, |handle| {
            let mut size = buf.len();
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key_buf.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(size)
        });
        match result {
            Ok(size) => Ok(Some(size)),
            Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Ok(None),
            Err(e) => {
                warn!("NvsAdapter: NVS read error {}", e);
                Err(StorageError::IoError)
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let key_buf = Self::key_buf(key);
        let result = Self::with_nvs_handle(NAMESPACE, true, |handle| {
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    key_buf.as_ptr() as *const _,
                    data.as_ptr() as *const _,
                    data.len(),
                )
            };
            if ret != ESP_OK {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK {
                return Err(ret);
            }
            Ok(())
        });
        result.map_err(|e| {
            warn!("NvsAdapter: NVS write error {}", e);
            StorageError::IoError
        })
    }

    /// NUL-terminated key, truncated to the 15-character NVS limit.
    #[cfg(target_os = "espidf")]
    fn key_buf(key: &str) -> [u8; 16] {
        let mut buf = [0u8; 16];
        let kb = key.as_bytes();
        let kl = kb.len().min(15);
        buf[..kl].copy_from_slice(&kb[..kl]);
        buf
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns_buf = Self::key_buf(namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

// ── SettingsPort implementation ───────────────────────────────

impl SettingsPort for NvsAdapter {
    fn read_byte(&mut self, addr: u16) -> Result<u8, StorageError> {
        self.image
            .get(usize::from(addr))
            .copied()
            .ok_or(StorageError::OutOfBounds)
    }

    fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), StorageError> {
        let slot = self
            .image
            .get_mut(usize::from(addr))
            .ok_or(StorageError::OutOfBounds)?;
        if *slot == value {
            return Ok(());
        }
        *slot = value;
        self.write_blob(SETTINGS_KEY, &self.image)
    }
}

// ── ConfigPort implementation ─────────────────────────────────

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<FirmwareConfig, ConfigError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        match self.read_blob(CONFIG_KEY, &mut buf) {
            Ok(Some(len)) if len <= MAX_BLOB_SIZE => {
                let cfg: FirmwareConfig =
                    postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
                config::validate(&cfg).map_err(ConfigError::ValidationFailed)?;
                info!("NvsAdapter: loaded config from store ({} bytes)", len);
                Ok(cfg)
            }
            Ok(Some(_)) => Err(ConfigError::Corrupted),
            Ok(None) => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(FirmwareConfig::default())
            }
            Err(_) => {
                warn!("NvsAdapter: config read failed, using defaults");
                Ok(FirmwareConfig::default())
            }
        }
    }

    fn save(&self, config: &FirmwareConfig) -> Result<(), ConfigError> {
        config::validate(config).map_err(ConfigError::ValidationFailed)?;
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let bytes = postcard::to_slice(config, &mut buf).map_err(|_| ConfigError::IoError)?;
        self.write_blob(CONFIG_KEY, bytes)
            .map_err(|_| ConfigError::IoError)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}

impl Default for NvsAdapter {
    fn default() -> Self {
        // Falls back to an empty image if NVS is unavailable.
        Self::new().unwrap_or_else(|_| Self::blank())
    }
}
