use std::fmt;
use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use crate::cs_table::KspaceCoord;
use crate::error::{CsTableError, Result};

/// integer strides of the sampling lattice outside of the ACS region
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub struct UndersamplingFactor {
    pub ry:usize,
    pub rz:usize,
}

/// reported when a requested factor had to be rounded to an integer stride
#[derive(Clone,Debug,PartialEq)]
pub struct RoundingNote {
    pub axis:&'static str,
    pub requested:f64,
    pub applied:usize,
}

impl fmt::Display for RoundingNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,"R{} rounded from {:.1} to {}",self.axis,self.requested,self.applied)
    }
}

impl UndersamplingFactor {
    pub fn new(ry:usize,rz:usize) -> Result<Self> {
        if ry < 1 || rz < 1 {
            return Err(CsTableError::InvalidParameter(
                format!("undersampling factors must be at least 1 (got Ry={} Rz={})",ry,rz)
            ));
        }
        Ok(Self{ry,rz})
    }

    /// validate and round requested factors. Any adjustment comes back as a note for the caller to report.
    pub fn normalize(ry:f64,rz:f64) -> Result<(Self,Vec<RoundingNote>)> {
        let mut notes = Vec::<RoundingNote>::new();
        let ry = round_factor("y",ry,&mut notes)?;
        let rz = round_factor("z",rz,&mut notes)?;
        Ok((Self::new(ry,rz)?,notes))
    }
}

fn round_factor(axis:&'static str,requested:f64,notes:&mut Vec<RoundingNote>) -> Result<usize> {
    if !requested.is_finite() {
        return Err(CsTableError::InvalidParameter(format!("R{} must be a finite number (got {})",axis,requested)));
    }
    // ties go to even
    let rounded = requested.round_ties_even();
    if rounded < 1.0 {
        return Err(CsTableError::InvalidParameter(
            format!("R{} must round to at least 1 (got {})",axis,requested)
        ));
    }
    let applied = rounded as usize;
    if rounded != requested {
        notes.push(RoundingNote{axis,requested,applied});
    }
    Ok(applied)
}

/// 1-based inclusive bounds of the fully sampled calibration block
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub struct AcsBounds {
    pub y1:usize,
    pub y2:usize,
    pub z1:usize,
    pub z2:usize,
}

impl AcsBounds {
    /// ky and kz are 1-based
    pub fn contains(&self,ky:usize,kz:usize) -> bool {
        self.y1 <= ky && ky <= self.y2 && self.z1 <= kz && kz <= self.z2
    }
}

#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub struct Extents {
    pub ky_min:i32,
    pub ky_max:i32,
    pub kz_min:i32,
    pub kz_max:i32,
}

impl Extents {
    pub fn from_coords(coords:&[KspaceCoord]) -> Option<Self> {
        let first = coords.first()?;
        let init = Extents {
            ky_min: first.k_phase,
            ky_max: first.k_phase,
            kz_min: first.k_slice,
            kz_max: first.k_slice,
        };
        Some(coords.iter().fold(init,|e,c| Extents {
            ky_min: e.ky_min.min(c.k_phase),
            ky_max: e.ky_max.max(c.k_phase),
            kz_min: e.kz_min.min(c.k_slice),
            kz_max: e.kz_max.max(c.k_slice),
        }))
    }
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
pub struct GrappaParams {
    /// ky x kz
    pub kspace_size:[usize;2],
    pub acs_size:[usize;2],
    pub factor:UndersamplingFactor,
}

impl GrappaParams {
    pub fn new(kspace_size:[usize;2],acs_size:[usize;2],factor:UndersamplingFactor) -> Self {
        Self {
            kspace_size,
            acs_size,
            factor
        }
    }

    pub fn validate(&self) -> Result<()> {
        let axes = ["ky","kz"];
        for i in 0..2 {
            let (n,acs) = (self.kspace_size[i],self.acs_size[i]);
            if n == 0 {
                return Err(CsTableError::InvalidParameter(format!("{} dimension of k-space must be positive",axes[i])));
            }
            if n > i32::MAX as usize {
                return Err(CsTableError::InvalidParameter(format!("{} dimension of k-space is too large ({})",axes[i],n)));
            }
            if acs == 0 {
                return Err(CsTableError::InvalidParameter(format!("{} dimension of the ACS region must be positive",axes[i])));
            }
            if acs > n {
                return Err(CsTableError::InvalidParameter(
                    format!("{} dimension of the ACS region ({}) is larger than k-space ({})",axes[i],acs,n)
                ));
            }
        }
        UndersamplingFactor::new(self.factor.ry,self.factor.rz)?;
        Ok(())
    }

    /// ACS block centered on the 1-based grid center
    pub fn acs_bounds(&self) -> Result<AcsBounds> {
        self.validate()?;
        let (y1,y2) = centered_bounds("ky",self.kspace_size[0],self.acs_size[0])?;
        let (z1,z2) = centered_bounds("kz",self.kspace_size[1],self.acs_size[1])?;
        Ok(AcsBounds{y1,y2,z1,z2})
    }

    pub fn generate(&self) -> Result<GrappaPattern> {
        let acs = self.acs_bounds()?;
        debug!("ACS bounds ky:[{},{}] kz:[{},{}]",acs.y1,acs.y2,acs.z1,acs.z2);
        let mask = sampling_mask(self.kspace_size,self.factor,&acs);
        let samples = centered_samples(&mask);
        Ok(GrappaPattern {
            params:self.clone(),
            acs,
            mask,
            samples,
        })
    }
}

fn centered_bounds(axis:&str,n:usize,acs:usize) -> Result<(usize,usize)> {
    let c = (n as f64 + 1.0)/2.0;
    let half = acs as f64/2.0;
    // half away from zero keeps the block exactly acs wide
    let lo = (c - half).round();
    let hi = (c + half - 1.0).round();
    if lo < 1.0 || hi > n as f64 || hi < lo {
        return Err(CsTableError::InvalidParameter(
            format!("ACS bounds [{},{}] fall outside of {} range [1,{}]",lo,hi,axis,n)
        ));
    }
    Ok((lo as usize,hi as usize))
}

fn sampling_mask(kspace_size:[usize;2],factor:UndersamplingFactor,acs:&AcsBounds) -> Array2<bool> {
    let (ky_dim,kz_dim) = (kspace_size[0],kspace_size[1]);
    // only divisibility matters, so the distance to the ACS corner is enough
    Array2::from_shape_fn((ky_dim,kz_dim),|(i,j)| {
        let (ky,kz) = (i + 1,j + 1);
        match acs.contains(ky,kz) {
            true => true,
            false => ky.abs_diff(acs.y1) % factor.ry == 0 && kz.abs_diff(acs.z1) % factor.rz == 0
        }
    })
}

fn centered_samples(mask:&Array2<bool>) -> Vec<KspaceCoord> {
    let (ky_dim,kz_dim) = mask.dim();
    let ky_off = (ky_dim/2) as i32;
    let kz_off = (kz_dim/2) as i32;
    // ndarray iterates in logical row-major order (ky outer, kz inner)
    mask.indexed_iter()
        .filter(|(_,sampled)| **sampled)
        .map(|((ky,kz),_)| KspaceCoord {
            k_phase: ky as i32 - ky_off,
            k_slice: kz as i32 - kz_off,
        })
        .collect()
}

/// mask and sample list for a GRAPPA-style 3D acquisition
pub fn grappa_3d_pattern(kspace_size:[usize;2],ry:usize,rz:usize,acs_size:[usize;2]) -> Result<(Array2<bool>,Vec<KspaceCoord>)> {
    let factor = UndersamplingFactor::new(ry,rz)?;
    let pattern = GrappaParams::new(kspace_size,acs_size,factor).generate()?;
    Ok(pattern.into_parts())
}

#[derive(Clone,Debug)]
pub struct GrappaPattern {
    params:GrappaParams,
    acs:AcsBounds,
    mask:Array2<bool>,
    samples:Vec<KspaceCoord>,
}

impl GrappaPattern {
    pub fn params(&self) -> &GrappaParams {
        &self.params
    }

    pub fn acs_bounds(&self) -> AcsBounds {
        self.acs
    }

    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    pub fn samples(&self) -> &[KspaceCoord] {
        &self.samples
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn n_cells(&self) -> usize {
        self.mask.len()
    }

    /// total cells over sampled cells
    pub fn acceleration(&self) -> f64 {
        self.n_cells() as f64 / self.n_samples() as f64
    }

    pub fn extents(&self) -> Option<Extents> {
        Extents::from_coords(&self.samples)
    }

    pub fn into_parts(self) -> (Array2<bool>,Vec<KspaceCoord>) {
        (self.mask,self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(kspace:[usize;2],acs:[usize;2],ry:usize,rz:usize) -> GrappaParams {
        GrappaParams::new(kspace,acs,UndersamplingFactor::new(ry,rz).unwrap())
    }

    // straight per-cell evaluation of the sampling rule
    fn reference_mask(kspace:[usize;2],acs:AcsBounds,ry:usize,rz:usize) -> Array2<bool> {
        let mut m = Array2::<bool>::from_elem((kspace[0],kspace[1]),false);
        for ky in 1..=kspace[0] {
            for kz in 1..=kspace[1] {
                let inside = ky >= acs.y1 && ky <= acs.y2 && kz >= acs.z1 && kz <= acs.z2;
                let dy = ky as i128 - acs.y1 as i128;
                let dz = kz as i128 - acs.z1 as i128;
                let lattice = dy.rem_euclid(ry as i128) == 0 && dz.rem_euclid(rz as i128) == 0;
                m[[ky-1,kz-1]] = inside || lattice;
            }
        }
        m
    }

    #[test]
    fn golden_8x8() {
        let p = params([8,8],[4,4],2,2).generate().unwrap();
        assert_eq!(p.acs_bounds(),AcsBounds{y1:3,y2:6,z1:3,z2:6});
        let expected:Vec<(i32,i32)> = vec![
            (-4,-4),(-4,-2),(-4,0),(-4,2),
            (-2,-4),(-2,-2),(-2,-1),(-2,0),(-2,1),(-2,2),
            (-1,-2),(-1,-1),(-1,0),(-1,1),
            (0,-4),(0,-2),(0,-1),(0,0),(0,1),(0,2),
            (1,-2),(1,-1),(1,0),(1,1),
            (2,-4),(2,-2),(2,0),(2,2),
        ];
        let got:Vec<(i32,i32)> = p.samples().iter().map(|c| (c.k_phase,c.k_slice)).collect();
        assert_eq!(got,expected);
        assert_eq!(p.n_samples(),28);
        assert!((p.acceleration() - 64.0/28.0).abs() < 1e-12);
        assert_eq!(p.extents(),Some(Extents{ky_min:-4,ky_max:2,kz_min:-4,kz_max:2}));
    }

    #[test]
    fn acs_is_fully_sampled() {
        for &(n,a) in &[(8,4),(9,4),(9,3),(128,25),(128,24),(5,5),(1,1),(16,1)] {
            let p = params([n,n+3],[a,a],4,3).generate().unwrap();
            let acs = p.acs_bounds();
            assert_eq!(acs.y2 - acs.y1 + 1,a);
            for ky in acs.y1..=acs.y2 {
                for kz in acs.z1..=acs.z2 {
                    assert!(p.mask()[[ky-1,kz-1]]);
                }
            }
        }
    }

    #[test]
    fn mask_matches_reference() {
        for ry in [1,2,3,4,1000,usize::MAX] {
            for rz in [1,2,3,4,usize::MAX] {
                for &(kspace,acs) in &[([8,8],[4,4]),([17,12],[5,2]),([32,20],[7,7]),([6,9],[6,1])] {
                    let p = params(kspace,acs,ry,rz).generate().unwrap();
                    let reference = reference_mask(kspace,p.acs_bounds(),ry,rz);
                    assert_eq!(p.mask(),&reference,"kspace {:?} acs {:?} R {}x{}",kspace,acs,ry,rz);
                }
            }
        }
    }

    #[test]
    fn samples_follow_mask() {
        let p = params([31,24],[9,6],3,2).generate().unwrap();
        let n_true = p.mask().iter().filter(|m| **m).count();
        assert_eq!(p.n_samples(),n_true);
        let keys:Vec<(i32,i32)> = p.samples().iter().map(|c| (c.k_phase,c.k_slice)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys,sorted);
        let again = params([31,24],[9,6],3,2).generate().unwrap();
        assert_eq!(p.samples(),again.samples());
        assert_eq!(p.mask(),again.mask());
    }

    #[test]
    fn extents_match_mask() {
        let p = params([30,21],[4,3],5,4).generate().unwrap();
        let (ky_dim,kz_dim) = p.mask().dim();
        let idx:Vec<(i32,i32)> = p.mask().indexed_iter()
            .filter(|(_,v)| **v)
            .map(|((i,j),_)| (i as i32 - (ky_dim/2) as i32,j as i32 - (kz_dim/2) as i32))
            .collect();
        let e = p.extents().unwrap();
        assert_eq!(e.ky_min,idx.iter().map(|c| c.0).min().unwrap());
        assert_eq!(e.ky_max,idx.iter().map(|c| c.0).max().unwrap());
        assert_eq!(e.kz_min,idx.iter().map(|c| c.1).min().unwrap());
        assert_eq!(e.kz_max,idx.iter().map(|c| c.1).max().unwrap());
        let af = p.mask().len() as f64 / idx.len() as f64;
        assert!((p.acceleration() - af).abs() < 1e-12);
    }

    #[test]
    fn unit_factor_is_full_sampling() {
        let p = params([10,7],[2,2],1,1).generate().unwrap();
        assert!(p.mask().iter().all(|m| *m));
        assert_eq!(p.acceleration(),1.0);
    }

    #[test]
    fn invalid_parameters() {
        assert!(matches!(UndersamplingFactor::new(0,2),Err(CsTableError::InvalidParameter(_))));
        assert!(matches!(params([8,8],[9,4],2,2).generate(),Err(CsTableError::InvalidParameter(_))));
        assert!(matches!(params([0,8],[0,4],2,2).generate(),Err(CsTableError::InvalidParameter(_))));
        assert!(matches!(params([8,8],[4,0],2,2).generate(),Err(CsTableError::InvalidParameter(_))));
        let bad_factor = GrappaParams::new([8,8],[4,4],UndersamplingFactor{ry:2,rz:0});
        assert!(matches!(bad_factor.generate(),Err(CsTableError::InvalidParameter(_))));
        assert!(grappa_3d_pattern([8,8],0,1,[2,2]).is_err());
    }

    #[test]
    fn factor_rounding() {
        let (f,notes) = UndersamplingFactor::normalize(2.0,3.0).unwrap();
        assert_eq!(f,UndersamplingFactor{ry:2,rz:3});
        assert!(notes.is_empty());

        let (f,notes) = UndersamplingFactor::normalize(2.5,3.6).unwrap();
        assert_eq!(f,UndersamplingFactor{ry:2,rz:4});
        assert_eq!(notes.len(),2);
        assert_eq!(notes[0].to_string(),"Ry rounded from 2.5 to 2");
        assert_eq!(notes[1].applied,4);

        assert!(UndersamplingFactor::normalize(0.4,2.0).is_err());

        // a stride far beyond the grid keeps only the ACS corner row
        let (huge,_) = UndersamplingFactor::normalize(1e30,1.0).unwrap();
        let (wide,_) = UndersamplingFactor::normalize(1000.0,1.0).unwrap();
        let a = GrappaParams::new([8,8],[2,2],huge).generate().unwrap();
        let b = GrappaParams::new([8,8],[2,2],wide).generate().unwrap();
        assert_eq!(a.n_samples(),10);
        assert_eq!(a.mask(),b.mask());
        assert!(UndersamplingFactor::normalize(f64::NAN,2.0).is_err());
    }
}
