use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use toml;
use cs_table::grappa::{GrappaParams, RoundingNote, UndersamplingFactor};
use crate::error::BuildError;

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct GrappaConfig {
    /// ky x kz
    pub kspace_size:[usize;2],
    /// fully sampled calibration block, ky x kz
    pub acs_size:[usize;2],
    pub ry:f64,
    pub rz:f64,
    pub output_dir:PathBuf,
    pub export_mask:bool,
    pub write_headfile:bool,
}

impl Config for GrappaConfig {
    fn default() -> Self {
        Self {
            kspace_size:[128,128],
            acs_size:[25,25],
            ry:2.0,
            rz:2.0,
            output_dir:PathBuf::from("./output"),
            export_mask:true,
            write_headfile:true,
        }
    }
}

impl ConfigFile for GrappaConfig {

    fn to_file(&self, filename: &Path) -> Result<PathBuf,BuildError> {
        let t = toml::to_string_pretty(&self)?;
        Ok(utils::write_to_file(filename,&Self::file_ext(),&t)?)
    }

    fn from_file(filename: &Path) -> Result<Self,BuildError> {
        let t = utils::read_to_string(filename,&Self::file_ext())?;
        Ok(toml::from_str(&t)?)
    }

    fn file_ext() -> String {
        String::from("grappa_config")
    }

}

impl GrappaConfig {
    /// rounded, validated generator parameters
    pub fn params(&self) -> Result<(GrappaParams,Vec<RoundingNote>),BuildError> {
        let (factor,notes) = UndersamplingFactor::normalize(self.ry,self.rz)?;
        let params = GrappaParams::new(self.kspace_size,self.acs_size,factor);
        params.validate()?;
        Ok((params,notes))
    }
}

pub trait Config {
    fn default() -> Self;
}

pub trait ConfigFile: Sized {
    fn to_file(&self, filename:&Path) -> Result<PathBuf,BuildError>;
    fn from_file(filename:&Path) -> Result<Self,BuildError>;
    fn file_ext() -> String;
}

#[test]
fn test(){
    let dir = std::env::temp_dir().join("grappa_config_test");
    std::fs::create_dir_all(&dir).unwrap();
    let mut cfg = GrappaConfig::default();
    cfg.ry = 2.6;
    let written = cfg.to_file(&dir.join("protocol")).unwrap();
    assert_eq!(written.extension().and_then(|e| e.to_str()),Some("grappa_config"));
    let back = GrappaConfig::from_file(&dir.join("protocol")).unwrap();
    assert_eq!(back,cfg);

    let (params,notes) = back.params().unwrap();
    assert_eq!(params.factor,UndersamplingFactor{ry:3,rz:2});
    assert_eq!(notes.len(),1);

    cfg.acs_size = [200,25];
    assert!(cfg.params().is_err());
}
