use std::{collections::HashMap, fmt, fs, path::Path, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::{Error, Result};

/// Label entries the raster geometry is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelKey {
    Lines,
    LineSamples,
    UpperLeftLatitude,
    UpperLeftLongitude,
    MapResolution,
    Bands,
}

impl LabelKey {
    pub const ALL: [LabelKey; 6] = [
        LabelKey::Bands,
        LabelKey::Lines,
        LabelKey::LineSamples,
        LabelKey::UpperLeftLatitude,
        LabelKey::UpperLeftLongitude,
        LabelKey::MapResolution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LabelKey::Lines => "LINES",
            LabelKey::LineSamples => "LINE_SAMPLES",
            LabelKey::UpperLeftLatitude => "UPPER_LEFT_LATITUDE",
            LabelKey::UpperLeftLongitude => "UPPER_LEFT_LONGITUDE",
            LabelKey::MapResolution => "MAP_RESOLUTION",
            LabelKey::Bands => "BANDS",
        }
    }
}

impl FromStr for LabelKey {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        LabelKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric values picked out of a plain-text `KEY = value` label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Label {
    values: HashMap<LabelKey, f64>,
}

impl Label {
    pub fn parse(contents: &str) -> Self {
        lazy_static! {
            static ref RE: Regex =
                Regex::new(r"\b([A-Z_]+)\s*=\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)")
                    .unwrap();
        }
        let mut values = HashMap::new();
        for line in contents.lines() {
            for cap in RE.captures_iter(line) {
                let key = match LabelKey::from_str(&cap[1]) {
                    Ok(key) => key,
                    Err(()) => continue,
                };
                if values.contains_key(&key) {
                    continue;
                }
                if let Ok(value) = f64::from_str(&cap[2]) {
                    values.insert(key, value);
                }
            }
        }
        Label { values }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading label file {:?}", path);
        let contents = fs::read_to_string(path)?;
        Ok(Self::parse(&contents))
    }

    pub fn get(&self, key: LabelKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    pub fn require(&self, key: LabelKey) -> Result<f64> {
        self.get(key).ok_or(Error::MetadataMissing(key))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LABEL: &str = r#"PDS_VERSION_ID       = PDS3
RECORD_TYPE          = FIXED_LENGTH
OBJECT               = IMAGE
  BANDS              = 1
  LINES              = 11600
  LINE_SAMPLES       = 9985
  SAMPLE_TYPE        = MSB_INTEGER
  SAMPLE_BITS        = 16
END_OBJECT           = IMAGE
OBJECT               = IMAGE_MAP_PROJECTION
  MAP_RESOLUTION     = 6064.67008483 <pix/deg>
  UPPER_LEFT_LATITUDE  = 21.3033847 <deg>
  UPPER_LEFT_LONGITUDE = 29.905747 <deg>
  LINES              = 42
END_OBJECT           = IMAGE_MAP_PROJECTION
END
"#;

    #[test]
    fn test_parse_known_keys() {
        let label = Label::parse(SAMPLE_LABEL);
        assert_eq!(label.len(), 6);
        assert_eq!(label.get(LabelKey::Bands), Some(1.0));
        assert_eq!(label.get(LabelKey::LineSamples), Some(9985.0));
        assert_eq!(label.get(LabelKey::MapResolution), Some(6064.67008483));
        assert_eq!(label.get(LabelKey::UpperLeftLatitude), Some(21.3033847));
        assert_eq!(label.get(LabelKey::UpperLeftLongitude), Some(29.905747));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let label = Label::parse(SAMPLE_LABEL);
        assert_eq!(label.get(LabelKey::Lines), Some(11600.0));
    }

    #[test]
    fn test_whole_word_keys() {
        let label = Label::parse("IMAGE_LINES = 7\nMAX_LINE_SAMPLES = 3\n");
        assert!(label.is_empty());
    }

    #[test]
    fn test_signed_values() {
        let label = Label::parse("UPPER_LEFT_LATITUDE = -12.5816902\nUPPER_LEFT_LONGITUDE=+25\n");
        assert_eq!(label.get(LabelKey::UpperLeftLatitude), Some(-12.5816902));
        assert_eq!(label.get(LabelKey::UpperLeftLongitude), Some(25.0));
    }

    #[test]
    fn test_missing_key() {
        let label = Label::parse("LINES = 10\n");
        match label.require(LabelKey::MapResolution) {
            Err(Error::MetadataMissing(LabelKey::MapResolution)) => (),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(label.require(LabelKey::Lines).unwrap(), 10.0);
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in LabelKey::ALL.iter() {
            assert_eq!(LabelKey::from_str(key.as_str()), Ok(*key));
        }
    }
}
