use std::path::PathBuf;

use anyhow::{Result, bail};
use client::socket_origin;

pub const DEFAULT_TOKEN_FILE: &str = ".incridea/token";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub socket_origin: String,
    pub token_file: PathBuf,
}

impl Config {
    pub fn new(api_url: &str, token_file: Option<PathBuf>) -> Result<Self> {
        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            bail!("INCRIDEA_API_URL must be an http(s) URL, got '{}'", api_url);
        }

        Ok(Self {
            socket_origin: socket_origin(&api_url),
            api_url,
            token_file: token_file.unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE)),
        })
    }
}
