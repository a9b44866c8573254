//! Shared helpers for reading INI configuration with `configparser`.
//!
//! Stores look up their entries in sections named `<kind>.<name>`, e.g.
//! `[particles.fire]` or `[tileset.hero]`. Values that fail to parse become
//! [`TilesparkError::Parse`] naming the section and key; a missing file
//! becomes [`TilesparkError::NotFound`].
//!
//! Files are read case-sensitively: `[particles.Fire]` is found by
//! `particles = Fire`, and keys must be written in lower case.

use std::path::Path;
use std::str::FromStr;

use configparser::ini::Ini;

use crate::error::{Result, TilesparkError};

/// Load an INI file from disk.
pub fn load_ini(path: &Path) -> Result<Ini> {
    if !path.is_file() {
        return Err(TilesparkError::NotFound(format!(
            "configuration file {}",
            path.display()
        )));
    }
    let mut ini = Ini::new_cs();
    ini.load(path)
        .map_err(|e| TilesparkError::parse(path.display().to_string(), "", e))?;
    Ok(ini)
}

/// Parse INI text held in memory.
pub fn read_ini(content: &str) -> Result<Ini> {
    let mut ini = Ini::new_cs();
    ini.read(content.to_string())
        .map_err(|e| TilesparkError::parse("<memory>", "", e))?;
    Ok(ini)
}

/// `(name, section)` pairs for every section called `<prefix>.<name>`, sorted by name.
pub fn sections_with_prefix(ini: &Ini, prefix: &str) -> Vec<(String, String)> {
    let mut found: Vec<(String, String)> = ini
        .sections()
        .into_iter()
        .filter_map(|section| {
            let name = section.strip_prefix(prefix)?.strip_prefix('.')?;
            if name.is_empty() {
                None
            } else {
                Some((name.to_string(), section.clone()))
            }
        })
        .collect();
    found.sort();
    found
}

/// Parse an optional value of any `FromStr` type.
pub fn get_parsed<T: FromStr>(ini: &Ini, section: &str, key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match ini.get(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| TilesparkError::parse(section, key, e.to_string())),
    }
}

/// Like [`get_parsed`] but the key must be present.
pub fn require_parsed<T: FromStr>(ini: &Ini, section: &str, key: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    get_parsed(ini, section, key)?.ok_or_else(|| TilesparkError::parse(section, key, "missing value"))
}

pub fn require_str(ini: &Ini, section: &str, key: &str) -> Result<String> {
    ini.get(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TilesparkError::parse(section, key, "missing value"))
}

/// Parse `"min-max"` or a single value (meaning `min == max`).
///
/// A leading `-` belongs to the first number, so `"-30-30"` is `(-30, 30)`
/// and `"-30--10"` is `(-30, -10)`.
pub fn parse_range<T: FromStr + Copy>(raw: &str) -> Option<(T, T)> {
    let raw = raw.trim();
    let split = raw
        .char_indices()
        .skip(1)
        .find(|&(i, c)| c == '-' && !raw[..i].ends_with('-'))
        .map(|(i, _)| i);
    match split {
        Some(i) => {
            let min = raw[..i].trim().parse().ok()?;
            let max = raw[i + 1..].trim().parse().ok()?;
            Some((min, max))
        }
        None => {
            let v = raw.parse().ok()?;
            Some((v, v))
        }
    }
}

/// Parse a comma separated list of numbers.
pub fn parse_list<T: FromStr>(raw: &str) -> Option<Vec<T>> {
    raw.split(',').map(|part| part.trim().parse().ok()).collect()
}

/// Read a range value, see [`parse_range`].
pub fn get_range<T: FromStr + Copy>(ini: &Ini, section: &str, key: &str) -> Result<Option<(T, T)>> {
    match ini.get(section, key) {
        None => Ok(None),
        Some(raw) => parse_range(&raw)
            .map(Some)
            .ok_or_else(|| TilesparkError::parse(section, key, format!("expected min-max, got '{}'", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_pair() {
        assert_eq!(parse_range::<u8>("200-255"), Some((200, 255)));
        assert_eq!(parse_range::<f32>(" 60 - 120 "), Some((60.0, 120.0)));
    }

    #[test]
    fn test_parse_range_single_value() {
        assert_eq!(parse_range::<u8>("200"), Some((200, 200)));
        assert_eq!(parse_range::<f32>("-30"), Some((-30.0, -30.0)));
    }

    #[test]
    fn test_parse_range_negative_bounds() {
        assert_eq!(parse_range::<f32>("-30-30"), Some((-30.0, 30.0)));
        assert_eq!(parse_range::<f32>("-30--10"), Some((-30.0, -10.0)));
    }

    #[test]
    fn test_parse_range_garbage() {
        assert_eq!(parse_range::<u8>("abc"), None);
        assert_eq!(parse_range::<u8>("10-"), None);
        assert_eq!(parse_range::<u8>("300"), None);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list::<f32>("0, 0,100,0"), Some(vec![0.0, 0.0, 100.0, 0.0]));
        assert_eq!(parse_list::<f32>("1,x"), None);
    }

    #[test]
    fn test_sections_with_prefix() {
        let ini = read_ini("[particles.fire]\na = 1\n[particles.smoke]\na = 2\n[tileset.hero]\nb = 3\n[particles]\nc = 4\n")
            .unwrap();
        let found = sections_with_prefix(&ini, "particles");
        let names: Vec<&str> = found.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["fire", "smoke"]);
    }

    #[test]
    fn test_get_parsed_errors_name_key() {
        let ini = read_ini("[window]\nwidth = wide\n").unwrap();
        let err = get_parsed::<u32>(&ini, "window", "width").unwrap_err();
        assert!(matches!(err, TilesparkError::Parse { ref key, .. } if key == "width"));
        assert_eq!(get_parsed::<u32>(&ini, "window", "height").unwrap(), None);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_ini(Path::new("./definitely/not/here.ini")).unwrap_err();
        assert!(matches!(err, TilesparkError::NotFound(_)));
    }

    #[test]
    fn test_section_names_keep_case() {
        let ini = read_ini("[particles.Fire]\ngenerations = 1\n").unwrap();
        assert_eq!(
            sections_with_prefix(&ini, "particles"),
            vec![("Fire".to_string(), "particles.Fire".to_string())]
        );
        assert_eq!(get_parsed::<u32>(&ini, "particles.Fire", "generations").unwrap(), Some(1));
    }
}
