//! Run configuration
//!
//! `DataPaths` locates the input tables; `RunParams` carries every parameter
//! that changes the pipeline output. Parameters layer as defaults, then an
//! optional JSON file, then per-field environment overrides.

use crate::error::{Result, SeedError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_TARGET_DENSITY: f64 = 250_000.0;
pub const DEFAULT_CHUNK_SIZE: usize = 30;
pub const DEFAULT_N_SPECIES: usize = 20;

/// Locations of the input tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPaths {
    pub data_dir: PathBuf,
}

impl DataPaths {
    pub const SPECIES_FILE: &'static str = "species_data.csv";
    pub const STOCKS_FILE: &'static str = "stocks_data.csv";
    pub const AREA_FILE: &'static str = "areas_data.csv";
    pub const REGION_TOP30_FILE: &'static str = "region_data_top30.csv";
    pub const REGION_TOP60_FILE: &'static str = "region_data_top60.csv";
    pub const GEOJSON_FILE: &'static str = "state_biome.geojson";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    /// Data directory from `DATA_DIR`, defaulting to `data`
    pub fn from_env() -> Self {
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
        Self::new(data_dir)
    }

    pub fn species(&self) -> PathBuf {
        self.data_dir.join(Self::SPECIES_FILE)
    }

    pub fn stocks(&self) -> PathBuf {
        self.data_dir.join(Self::STOCKS_FILE)
    }

    pub fn areas(&self) -> PathBuf {
        self.data_dir.join(Self::AREA_FILE)
    }

    pub fn regions(&self, set: TargetSpeciesSet) -> PathBuf {
        match set {
            TargetSpeciesSet::Top30 => self.data_dir.join(Self::REGION_TOP30_FILE),
            TargetSpeciesSet::Top60 => self.data_dir.join(Self::REGION_TOP60_FILE),
        }
    }

    /// Boundary collection used by map renderers; never read by the pipeline
    pub fn geojson(&self) -> PathBuf {
        self.data_dir.join(Self::GEOJSON_FILE)
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new("data")
    }
}

/// Which region table feeds the allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSpeciesSet {
    #[default]
    Top30,
    Top60,
}

impl FromStr for TargetSpeciesSet {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace([' ', '_'], "").as_str() {
            "top30" => Ok(TargetSpeciesSet::Top30),
            "top60" => Ok(TargetSpeciesSet::Top60),
            _ => Err(SeedError::invalid_parameter(
                "target_species",
                format!("unknown target species set '{}' (expected top30 or top60)", s),
            )),
        }
    }
}

/// Supply channel of a stock record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SupplyType {
    #[serde(rename = "supplier_top")]
    SupplierTop,
    #[serde(rename = "supplier_2ry")]
    Supplier2ry,
    #[serde(rename = "pilot_top")]
    PilotTop,
    #[serde(rename = "pilot_2ry")]
    Pilot2ry,
}

impl SupplyType {
    pub const ALL: [SupplyType; 4] = [
        SupplyType::SupplierTop,
        SupplyType::Supplier2ry,
        SupplyType::PilotTop,
        SupplyType::Pilot2ry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SupplyType::SupplierTop => "supplier_top",
            SupplyType::Supplier2ry => "supplier_2ry",
            SupplyType::PilotTop => "pilot_top",
            SupplyType::Pilot2ry => "pilot_2ry",
        }
    }
}

impl fmt::Display for SupplyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupplyType {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        SupplyType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                SeedError::invalid_parameter("supply_type", format!("unknown supply type '{}'", s))
            })
    }
}

/// Area column used for relative-area distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaVariant {
    /// Total state×biome area (`Area`)
    #[default]
    Total,
    /// Potential reforestation area (`area_potential`)
    Potential,
}

impl FromStr for AreaVariant {
    type Err = SeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "total" => Ok(AreaVariant::Total),
            "potential" => Ok(AreaVariant::Potential),
            _ => Err(SeedError::invalid_parameter(
                "area_variant",
                format!("unknown area variant '{}' (expected total or potential)", s),
            )),
        }
    }
}

/// How combined stock is split across the regions listing a species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionPolicy {
    /// Divide each species' stock by the number of regions listing it
    pub use_species_count: bool,
    /// Weight each region's slice by its share of the species' total area
    pub use_relative_area: bool,
    /// Only consulted when `use_relative_area` is set
    pub area_variant: AreaVariant,
}

/// Every parameter that affects the output of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParams {
    pub target_species: TargetSpeciesSet,
    /// Seeds per hectare
    pub target_density: f64,
    pub chunk_size: usize,
    pub suppliers: Vec<SupplyType>,
    pub distribution: DistributionPolicy,
    pub n_species: usize,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            target_species: TargetSpeciesSet::default(),
            target_density: DEFAULT_TARGET_DENSITY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            suppliers: vec![SupplyType::SupplierTop],
            distribution: DistributionPolicy::default(),
            n_species: DEFAULT_N_SPECIES,
        }
    }
}

impl RunParams {
    /// Load parameters from a JSON file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let params: RunParams = serde_json::from_str(&contents)?;
        Ok(params)
    }

    /// Build parameters from `PARAMS_FILE` (if set) plus environment overrides
    pub fn from_env() -> Result<Self> {
        let base = match std::env::var("PARAMS_FILE") {
            Ok(path) => Self::load(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply per-field overrides looked up by environment-style key
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup("TARGET_SPECIES") {
            self.target_species = v.parse()?;
        }
        if let Some(v) = lookup("TARGET_DENSITY") {
            self.target_density = parse_number("target_density", &v)?;
        }
        if let Some(v) = lookup("CHUNK_SIZE") {
            self.chunk_size = parse_number("chunk_size", &v)?;
        }
        if let Some(v) = lookup("SUPPLIERS") {
            self.suppliers = v
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse)
                .collect::<Result<Vec<_>>>()?;
        }
        if let Some(v) = lookup("USE_SPECIES_COUNT") {
            self.distribution.use_species_count = parse_flag("use_species_count", &v)?;
        }
        if let Some(v) = lookup("USE_RELATIVE_AREA") {
            self.distribution.use_relative_area = parse_flag("use_relative_area", &v)?;
        }
        if let Some(v) = lookup("AREA_VARIANT") {
            self.distribution.area_variant = v.parse()?;
        }
        if let Some(v) = lookup("N_SPECIES") {
            self.n_species = parse_number("n_species", &v)?;
        }
        Ok(self)
    }

    /// Check every parameter against its domain
    pub fn validate(&self) -> Result<()> {
        if !self.target_density.is_finite() || self.target_density < 0.0 {
            return Err(SeedError::invalid_parameter(
                "target_density",
                format!("must be a finite number >= 0, got {}", self.target_density),
            ));
        }
        if self.chunk_size == 0 {
            return Err(SeedError::invalid_parameter("chunk_size", "must be at least 1"));
        }
        if self.suppliers.is_empty() {
            return Err(SeedError::invalid_parameter("suppliers", "select at least one supply type"));
        }
        if self.n_species == 0 {
            return Err(SeedError::invalid_parameter("n_species", "must be at least 1"));
        }
        Ok(())
    }
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| SeedError::invalid_parameter(name, format!("cannot parse '{}'", raw)))
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SeedError::invalid_parameter(name, format!("expected a boolean, got '{}'", raw))),
    }
}
