use std::fmt;
use std::path::{Path, PathBuf};
use log::{info, warn};
use cs_table::cs_table::{CSTable, MAX_TABLE_ELEMENTS};
use cs_table::grappa::Extents;
use cs_table::summary::PatternSummary;
use headfile::headfile::Headfile;
use mr_data::cfl;
use crate::args::{BuildArgs, GenerateArgs, InspectArgs, NewConfigArgs};
use crate::config::{Config, ConfigFile, GrappaConfig};
use crate::error::BuildError;

pub const LUT_PATTERN:&str = "nrLUT_*.txt";

pub struct BuildOutput {
    pub summary:PatternSummary,
    pub lut:PathBuf,
    pub mask:Option<PathBuf>,
    pub headfile:Option<PathBuf>,
}

impl fmt::Display for BuildOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f,"\n{}",self.summary)?;
        write!(f,"Output file                : {}",self.lut.display())?;
        if let Some(mask) = &self.mask {
            write!(f,"\nMask (cfl)                 : {}",mask.display())?;
        }
        if let Some(hf) = &self.headfile {
            write!(f,"\nHeadfile                   : {}",hf.display())?;
        }
        Ok(())
    }
}

pub struct TableReport {
    pub source:PathBuf,
    pub n_views:usize,
    pub header:(i16,u16),
    pub extents:Option<Extents>,
}

impl fmt::Display for TableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f,"lut                        : {}",self.source.display())?;
        writeln!(f,"header (low16, high16)     : {} {}",self.header.0,self.header.1)?;
        write!(f,"Encodes (lines)            : {}",self.n_views)?;
        if let Some(e) = &self.extents {
            write!(f,"\nky range: {} to {}\nkz range: {} to {}",e.ky_min,e.ky_max,e.kz_min,e.kz_max)?;
        }
        Ok(())
    }
}

pub fn new_config(args:&NewConfigArgs) -> Result<(),BuildError> {
    let p = GrappaConfig::default().to_file(&args.destination)?;
    info!("default config written to {:?}",p);
    Ok(())
}

pub fn build(args:&BuildArgs) -> Result<BuildOutput,BuildError> {
    let mut cfg = GrappaConfig::from_file(&args.config)?;
    if let Some(dir) = &args.output_dir {
        cfg.output_dir = dir.clone();
    }
    run(&cfg)
}

pub fn generate(args:&GenerateArgs) -> Result<BuildOutput,BuildError> {
    let cfg = GrappaConfig {
        kspace_size:[args.ky,args.kz],
        acs_size:[args.acs_ky,args.acs_kz],
        ry:args.ry,
        rz:args.rz,
        output_dir:args.output_dir.clone(),
        export_mask:!args.no_mask,
        write_headfile:!args.no_headfile,
    };
    run(&cfg)
}

/// generate the pattern and write the lut along with any requested extras
pub fn run(cfg:&GrappaConfig) -> Result<BuildOutput,BuildError> {
    let (params,notes) = cfg.params()?;
    for note in &notes {
        info!("{}",note);
    }
    let pattern = params.generate()?;
    let summary = PatternSummary::from_pattern(&pattern)?;

    utils::create_dir(&cfg.output_dir)?;
    let lut = cfg.output_dir.join(summary.lut_file_name());
    let table = CSTable::from_samples(pattern.samples());
    table.write(&lut)?;
    info!("{} views written to {:?}",table.n_views(),lut);

    let mask = match cfg.export_mask {
        true => {
            let base = cfg.output_dir.join(mask_base_name(&summary));
            cfl::write_mask(pattern.mask(),&base)?;
            let (hdr,_) = cfl::cfl_base_decode(&base);
            info!("sampling mask written to {:?}",hdr);
            Some(base)
        }
        false => None
    };

    let headfile = match cfg.write_headfile {
        true => {
            let hf = Headfile::new(&lut.with_extension("headfile"))?;
            hf.append(&summary.to_hash())?;
            Some(hf.path().to_owned())
        }
        false => None
    };

    Ok(BuildOutput {
        summary,
        lut,
        mask,
        headfile,
    })
}

// no dots allowed, cfl extensions are swapped in
fn mask_base_name(summary:&PatternSummary) -> String {
    format!("grappa_mask_{}x{}_R{}x{}",summary.kspace_size[0],summary.kspace_size[1],summary.ry,summary.rz)
}

pub fn inspect(args:&InspectArgs) -> Result<TableReport,BuildError> {
    let lut = find_lut(&args.path)?;
    let table = CSTable::open(&lut)?;
    if table.exceeds_scanner_capacity() {
        warn!("{} elements will not fit in the scanner lut ({} max)",table.n_elements(),MAX_TABLE_ELEMENTS);
    }
    Ok(TableReport {
        source:lut,
        n_views:table.n_views(),
        header:table.header()?,
        extents:Extents::from_coords(table.coordinates()),
    })
}

fn find_lut(path:&Path) -> Result<PathBuf,BuildError> {
    match path.is_dir() {
        true => utils::get_first_match(path,LUT_PATTERN).ok_or_else(|| BuildError::LutNotFound(path.to_owned())),
        false => Ok(path.to_owned())
    }
}
