use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::{CsTableError, Result};
use crate::grappa::{Extents, GrappaPattern};

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct PatternSummary {
    pub kspace_size:[usize;2],
    pub acs_size:[usize;2],
    pub ry:usize,
    pub rz:usize,
    pub acceleration:f64,
    pub n_encodes:usize,
    pub extents:Extents,
}

impl PatternSummary {
    pub fn from_pattern(pattern:&GrappaPattern) -> Result<Self> {
        let extents = pattern.extents().ok_or(
            CsTableError::InvalidParameter(String::from("pattern has no samples"))
        )?;
        let p = pattern.params();
        Ok(Self {
            kspace_size:p.kspace_size,
            acs_size:p.acs_size,
            ry:p.factor.ry,
            rz:p.factor.rz,
            acceleration:pattern.acceleration(),
            n_encodes:pattern.n_samples(),
            extents,
        })
    }

    /// nrLUT_3D_GRAPPA_R{af}_{ky}x{kz}.txt
    pub fn lut_file_name(&self) -> String {
        format!("nrLUT_3D_GRAPPA_R{:.2}_{}x{}.txt",self.acceleration,self.kspace_size[0],self.kspace_size[1])
    }

    /// fields for a headfile
    pub fn to_hash(&self) -> HashMap<String,String> {
        let mut h = HashMap::<String,String>::new();
        h.insert(String::from("grappa_kspace_size"),format!("{}:{}",self.kspace_size[0],self.kspace_size[1]));
        h.insert(String::from("grappa_acs_size"),format!("{}:{}",self.acs_size[0],self.acs_size[1]));
        h.insert(String::from("grappa_ry"),self.ry.to_string());
        h.insert(String::from("grappa_rz"),self.rz.to_string());
        h.insert(String::from("grappa_acceleration"),format!("{:.4}",self.acceleration));
        h.insert(String::from("grappa_n_encodes"),self.n_encodes.to_string());
        h.insert(String::from("grappa_ky_range"),format!("{}:{}",self.extents.ky_min,self.extents.ky_max));
        h.insert(String::from("grappa_kz_range"),format!("{}:{}",self.extents.kz_min,self.extents.kz_max));
        h
    }
}

impl fmt::Display for PatternSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f,"------- GRAPPA 3D K-space summary -------")?;
        writeln!(f,"K-space size               : {} x {}",self.kspace_size[0],self.kspace_size[1])?;
        writeln!(f,"ACS size                   : {} x {}",self.acs_size[0],self.acs_size[1])?;
        writeln!(f,"Undersampling              : {} x {}",self.ry,self.rz)?;
        writeln!(f,"Effective acceleration     : {:.2}",self.acceleration)?;
        writeln!(f,"Encodes (lines)            : {}",self.n_encodes)?;
        writeln!(f,"ky range: {} to {}",self.extents.ky_min,self.extents.ky_max)?;
        write!(f,"kz range: {} to {}",self.extents.kz_min,self.extents.kz_max)
    }
}

#[test]
fn summary_8x8() {
    use crate::grappa::{GrappaParams, UndersamplingFactor};
    let params = GrappaParams::new([8,8],[4,4],UndersamplingFactor::new(2,2).unwrap());
    let s = PatternSummary::from_pattern(&params.generate().unwrap()).unwrap();
    assert_eq!(s.n_encodes,28);
    assert_eq!(s.lut_file_name(),"nrLUT_3D_GRAPPA_R2.29_8x8.txt");
    let txt = s.to_string();
    assert!(txt.contains("Effective acceleration     : 2.29"));
    assert!(txt.ends_with("kz range: -4 to 2"));
    assert_eq!(s.to_hash().get("grappa_n_encodes").map(|v| v.as_str()),Some("28"));
}
