use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ProfileFileError, ProjectError};
use crate::path::FieldPath;

/// Named, server-configured default field set selected via the `response`
/// request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseProfile {
    #[default]
    Default,
    QuickBrowse,
    QuickView,
}

impl ResponseProfile {
    pub const ALL: [ResponseProfile; 3] = [
        ResponseProfile::Default,
        ResponseProfile::QuickBrowse,
        ResponseProfile::QuickView,
    ];
}

impl std::fmt::Display for ResponseProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseProfile::Default => write!(f, "default"),
            ResponseProfile::QuickBrowse => write!(f, "quick_browse"),
            ResponseProfile::QuickView => write!(f, "quick_view"),
        }
    }
}

impl FromStr for ResponseProfile {
    type Err = ProjectError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "default" => Ok(ResponseProfile::Default),
            "quick_browse" => Ok(ResponseProfile::QuickBrowse),
            "quick_view" => Ok(ResponseProfile::QuickView),
            other => Err(ProjectError::UnknownResponseProfile(other.to_string())),
        }
    }
}

/// Per-profile default field sets, operator-configurable via a YAML file.
///
/// `None` for a profile means "no restriction": every schema field is
/// included. The compiled-in defaults leave `default` unrestricted and give
/// the quick profiles curated card/detail field sets.
#[derive(Debug, Clone)]
pub struct ProfileDefaults {
    default: Option<BTreeSet<FieldPath>>,
    quick_browse: Option<BTreeSet<FieldPath>>,
    quick_view: Option<BTreeSet<FieldPath>>,
}

/// On-disk shape of the profiles file:
///
/// ```yaml
/// profiles:
///   quick_browse:
///     - id
///     - name
///     - prices.price
/// ```
#[derive(Debug, Deserialize)]
struct ProfilesFile {
    profiles: HashMap<String, Vec<String>>,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            default: None,
            quick_browse: Some(path_set(&[
                "id",
                "name",
                "slug",
                "permalink",
                "prices.currency_code",
                "prices.price",
                "prices.regular_price",
                "prices.sale_price",
                "on_sale",
                "images",
            ])),
            quick_view: Some(path_set(&[
                "id",
                "name",
                "slug",
                "permalink",
                "type",
                "short_description",
                "sku",
                "prices",
                "on_sale",
                "stock",
                "add_to_cart",
                "images",
                "categories",
                "average_rating",
                "review_count",
            ])),
        }
    }
}

impl ProfileDefaults {
    /// The default field set for `profile`, or `None` when the profile is
    /// unrestricted.
    #[must_use]
    pub fn fields_for(&self, profile: ResponseProfile) -> Option<&BTreeSet<FieldPath>> {
        match profile {
            ResponseProfile::Default => self.default.as_ref(),
            ResponseProfile::QuickBrowse => self.quick_browse.as_ref(),
            ResponseProfile::QuickView => self.quick_view.as_ref(),
        }
    }

    /// Parses a profiles file, overriding the compiled-in defaults for every
    /// profile the file names.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileFileError`] if the YAML is malformed, names an
    /// unknown profile, or contains an invalid dotted path.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ProfileFileError> {
        let file: ProfilesFile = serde_yaml::from_str(raw)?;
        let mut defaults = Self::default();

        for (name, raw_paths) in file.profiles {
            let profile = name
                .parse::<ResponseProfile>()
                .map_err(|_| ProfileFileError::UnknownProfile(name.clone()))?;

            let mut paths = BTreeSet::new();
            for raw_path in raw_paths {
                let path =
                    raw_path
                        .parse::<FieldPath>()
                        .map_err(|_| ProfileFileError::InvalidPath {
                            profile: name.clone(),
                            path: raw_path.clone(),
                        })?;
                paths.insert(path);
            }

            match profile {
                ResponseProfile::Default => defaults.default = Some(paths),
                ResponseProfile::QuickBrowse => defaults.quick_browse = Some(paths),
                ResponseProfile::QuickView => defaults.quick_view = Some(paths),
            }
        }

        Ok(defaults)
    }

    /// Loads and parses a profiles file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileFileError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ProfileFileError> {
        let content = std::fs::read_to_string(path).map_err(|e| ProfileFileError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }
}

fn path_set(raw: &[&str]) -> BTreeSet<FieldPath> {
    raw.iter()
        .map(|s| s.parse::<FieldPath>().expect("builtin profile path"))
        .collect()
}
