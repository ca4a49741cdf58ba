// src/utils.rs

use crate::error::*;
use anyhow::Context;
use regex::Regex;
use serde::Serialize;
use std::{io::Write, path::Path, sync::LazyLock};

pub static UUID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{8}-([a-f0-9]{4}-){3}[a-f0-9]{12}$").unwrap());
pub static CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}$").unwrap());

pub fn is_device_id(text: &str) -> bool {
    UUID_PATTERN.is_match(text)
}

pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 { text.to_string() } else { format!("{}...", &text[..end_pos]) }
}

/// 先写入同目录下的临时文件再原子替换，避免中断时留下半截 JSON。
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let json_content = serde_json::to_string_pretty(value)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("无法在 '{}' 创建临时文件", dir.display()))?;
    tmp.write_all(json_content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_device_id() {
        assert!(is_device_id("0f8fad5b-d9cb-469f-a165-70867728950e"));
        // 大写、缺段、空串都不算
        assert!(!is_device_id("0F8FAD5B-D9CB-469F-A165-70867728950E"));
        assert!(!is_device_id("0f8fad5b-d9cb-469f-a165"));
        assert!(!is_device_id(""));
        assert!(is_device_id(&uuid::Uuid::new_v4().to_string()));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 20), "short");
        assert_eq!(truncate_text("abcdefghijklmnop", 10), "abcdefg...");
        // 中文按双倍宽度计算
        assert_eq!(truncate_text("高等数学高等数学", 10), "高等数...");
    }

    #[test]
    fn test_write_json_atomic_creates_parent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("value.json");

        write_json_atomic(&path, &serde_json::json!({"a": 1})).unwrap();
        write_json_atomic(&path, &serde_json::json!({"a": 2})).unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["a"], 2);
    }
}
