//! Variables exchanged with the coupled hydrological model

use crate::weather::record::MM_PER_CM;

/// Unit conversion applied to injected values
pub type Conversion = fn(f64) -> f64;

pub fn mm_to_cm(x: f64) -> f64 {
    x / MM_PER_CM
}

/// A variable the coupled model may write into the grid
#[derive(Debug, Clone, Copy)]
pub struct InputVariable {
    pub name: &'static str,
    pub description: &'static str,
    pub units: &'static str,
    /// Field the value is forwarded to inside each engine
    pub engine_name: &'static str,
    pub convert: Conversion,
}

/// A variable the coupled model may read from the grid
#[derive(Debug, Clone, Copy)]
pub struct OutputVariable {
    pub name: &'static str,
    pub description: &'static str,
    pub units: &'static str,
}

const INPUTS: [InputVariable; 2] = [
    InputVariable {
        name: "Transpiration",
        description: "Actual crop transpiration",
        units: "mm/day",
        engine_name: "TRA",
        convert: mm_to_cm,
    },
    InputVariable {
        name: "PotTrans",
        description: "Potential crop transpiration",
        units: "mm/day",
        engine_name: "TRAMX",
        convert: mm_to_cm,
    },
];

const OUTPUTS: [OutputVariable; 5] = [
    OutputVariable { name: "LAI", description: "Leaf area index", units: "m2.m-2" },
    OutputVariable { name: "RD", description: "Rooting depth", units: "cm" },
    OutputVariable { name: "TAGP", description: "Total above-ground production", units: "kg.ha-1" },
    OutputVariable { name: "TWSO", description: "Total weight storage organs", units: "kg.ha-1" },
    OutputVariable { name: "DVS", description: "Development stage", units: "-" },
];

/// Immutable lookup of input and output variables
#[derive(Debug, Clone)]
pub struct VariableCatalog {
    inputs: Vec<InputVariable>,
    outputs: Vec<OutputVariable>,
}

impl Default for VariableCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl VariableCatalog {
    /// Transpiration inputs and crop-state outputs
    pub fn standard() -> Self {
        Self {
            inputs: INPUTS.to_vec(),
            outputs: OUTPUTS.to_vec(),
        }
    }

    pub fn input(&self, name: &str) -> Option<&InputVariable> {
        self.inputs.iter().find(|v| v.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&OutputVariable> {
        self.outputs.iter().find(|v| v.name == name)
    }

    pub fn input_names(&self) -> Vec<&'static str> {
        self.inputs.iter().map(|v| v.name).collect()
    }

    pub fn output_names(&self) -> Vec<&'static str> {
        self.outputs.iter().map(|v| v.name).collect()
    }

    /// Units of an input or output variable
    pub fn units(&self, name: &str) -> Option<&'static str> {
        self.input(name)
            .map(|v| v.units)
            .or_else(|| self.output(name).map(|v| v.units))
    }
}
