//! Column-name constants for the input and output tables.
//! Header names are part of the file contract and must match exactly.

// ── Species table ───────────────────────────────────────────────────────────
pub mod species {
    pub const TABLE: &str = "species";
    pub const SPECIES: &str = "Species";
    pub const SEEDS_PER_KG: &str = "Seeds/kg";
    pub const GERMINATION_RATE: &str = "Germination Rate (%)";

    pub const REQUIRED: [&str; 3] = [SPECIES, SEEDS_PER_KG, GERMINATION_RATE];
}

// ── Stock table ─────────────────────────────────────────────────────────────
pub mod stock {
    pub const TABLE: &str = "stock";
    pub const SPECIE: &str = "Specie";
    pub const SUPPLY_TYPE: &str = "Supply_Type";
    pub const QUANTITY_KG: &str = "Total_MORFO_Supply_Kg";

    pub const REQUIRED: [&str; 3] = [SPECIE, SUPPLY_TYPE, QUANTITY_KG];
}

// ── Region table (top 30 / top 60 variants share one schema) ────────────────
pub mod region {
    pub const TABLE: &str = "region";
    pub const REGION_KEY: &str = "regionkey";
    pub const STATE: &str = "STATE";
    pub const BIOME: &str = "BIOME";
    pub const SPECIE: &str = "Specie";

    pub const REQUIRED: [&str; 4] = [REGION_KEY, STATE, BIOME, SPECIE];
}

// ── Area table ──────────────────────────────────────────────────────────────
pub mod area {
    pub const TABLE: &str = "area";
    pub const REGION_KEY: &str = "regionkey";
    pub const AREA: &str = "Area";
    pub const AREA_POTENTIAL: &str = "area_potential";

    pub const REQUIRED: [&str; 2] = [REGION_KEY, AREA];
}

// ── Intermediate tables (exported for inspection) ───────────────────────────
pub mod density {
    pub const SPECIES: &str = "Species";
    pub const ORDINAL: &str = "ordinal";
    pub const SEEDS_PER_KG: &str = "Seeds/kg";
    pub const GERMINATION_RATE: &str = "Germination Rate (%)";
    pub const CHUNK_INDEX: &str = "chunk_index";
    pub const WEIGHT: &str = "Weight";
    pub const SUM_OF_WEIGHTS: &str = "sum_of_weights";
    pub const SEEDS_PER_HA: &str = "Seeds/ha";
    pub const KG_PER_HA: &str = "kg/ha";
}

pub mod allocation {
    pub const REGION_KEY: &str = "regionkey";
    pub const STATE: &str = "STATE";
    pub const BIOME: &str = "BIOME";
    pub const SPECIE: &str = "Specie";
    pub const AREA: &str = "Area";
    pub const KG_PER_HA: &str = "kg/ha";
    pub const COMBINED_STOCK: &str = "Combined_Stock";
    pub const COUNT_APPEARANCES: &str = "CountAppearances";
    pub const SUM_AREA: &str = "SumArea";
    pub const ALLOCATED_STOCK: &str = "allocated_stock";
    pub const POSSIBLE_HA: &str = "Possible_ha_distributed";
}

// ── Final output ────────────────────────────────────────────────────────────
pub mod output {
    pub const REGION_KEY: &str = "regionkey";
    pub const THRESHOLD_HA: &str = "Threshold_ha";
    pub const NUM_SPECIES_USED: &str = "NumSpeciesUsed";
    pub const SPECIES_COUNT: &str = "species_count";
}
