use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use log::warn;
use serde::{Deserialize, Serialize};
use crate::error::{CsTableError, Result};

/// number of 16-bit entries the scanner lut can hold
pub const MAX_TABLE_ELEMENTS:usize = 196095;

/// centered phase (ky) and slice (kz) encode of one view
#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,PartialOrd,Ord,Serialize,Deserialize)]
pub struct KspaceCoord {
    pub k_phase:i32,
    pub k_slice:i32
}

pub struct CSTable {
    source:Option<PathBuf>,
    coords:Vec<KspaceCoord>,
}

/// Split a 32-bit count into the two header entries of a lut.
/// The low half is handed out as signed and the high half as unsigned. This
/// is what the sequence side reads back, so it must not be "fixed" here.
pub fn split32to16(value:u32) -> (i16,u16) {
    let high16 = ((value >> 16) & 0xFFFF) as u16;
    let low16 = (value & 0xFFFF) as u16 as i16;
    (low16,high16)
}

pub fn join16to32(low16:i16,high16:u16) -> u32 {
    ((high16 as u32) << 16) | (low16 as u16 as u32)
}

impl CSTable {

    pub fn from_samples(samples:&[KspaceCoord]) -> Self {
        Self {
            source:None,
            coords:samples.to_vec(),
        }
    }

    pub fn open(source:&Path) -> Result<Self> {
        let mut s = String::new();
        let mut f = File::open(source)?;
        f.read_to_string(&mut s)?;
        let mut table = Self::parse(&s)?;
        table.source = Some(source.to_owned());
        Ok(table)
    }

    /// read the header and coordinate list from lut text
    pub fn parse(text:&str) -> Result<Self> {
        let mut values = Vec::<i64>::new();
        for (i,line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue
            }
            let v:i64 = line.parse().map_err(|_|
                CsTableError::Parse(format!("line {} is not an integer: {:?}",i+1,line))
            )?;
            values.push(v);
        }
        if values.len() < 2 {
            return Err(CsTableError::Parse(String::from("missing element count header")));
        }
        let low16 = i16::try_from(values[0]).map_err(|_|
            CsTableError::Parse(format!("low half of count out of range: {}",values[0]))
        )?;
        let high16 = u16::try_from(values[1]).map_err(|_|
            CsTableError::Parse(format!("high half of count out of range: {}",values[1]))
        )?;
        let n_views = join16to32(low16,high16) as usize;
        let elements = &values[2..];
        if (elements.len() % 2) != 0 {
            return Err(CsTableError::Parse(String::from("table must have an even number of elements")));
        }
        if elements.len()/2 != n_views {
            return Err(CsTableError::Parse(
                format!("header declares {} views but table holds {}",n_views,elements.len()/2)
            ));
        }
        if let Some(v) = elements.iter().find(|v| i16::try_from(**v).is_err()) {
            return Err(CsTableError::Parse(format!("coordinate {} does not fit in 16 bits",v)));
        }
        let coords = elements.chunks_exact(2).map(|pair| KspaceCoord {
            k_phase:pair[0] as i32,
            k_slice:pair[1] as i32,
        }).collect();
        Ok(Self {
            source:None,
            coords
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn n_elements(&self) -> usize {
        2*self.coords.len()
    }

    pub fn n_views(&self) -> usize {
        self.coords.len()
    }

    pub fn exceeds_scanner_capacity(&self) -> bool {
        self.n_elements() > MAX_TABLE_ELEMENTS
    }

    /// count header as written to the first two lines
    pub fn header(&self) -> Result<(i16,u16)> {
        let n = u32::try_from(self.n_views()).map_err(|_|
            CsTableError::Encoding(format!("{} views cannot be represented in 32 bits",self.n_views()))
        )?;
        Ok(split32to16(n))
    }

    pub fn coordinates(&self) -> &[KspaceCoord] {
        &self.coords
    }

    /// de-centered (0-based) matrix indices of each view
    pub fn indices(&self,matrix_size:[usize;2]) -> Vec<(i64,i64)> {
        let phase_off = (matrix_size[0]/2) as i64;
        let slice_off = (matrix_size[1]/2) as i64;
        self.coords.iter().map(|coord| (coord.k_phase as i64 + phase_off,coord.k_slice as i64 + slice_off)).collect()
    }

    /// Serialize the table. Everything is checked before the first byte goes out.
    pub fn write_to<W:Write>(&self,writer:W) -> Result<()> {
        let (low16,high16) = self.header()?;
        if let Some(c) = self.coords.iter().find(|c| !fits_i16(c.k_phase) || !fits_i16(c.k_slice)) {
            return Err(CsTableError::Encoding(
                format!("coordinate ({},{}) is outside of the 16-bit lut range",c.k_phase,c.k_slice)
            ));
        }
        if self.exceeds_scanner_capacity() {
            warn!("table has {} elements, scanner lut only holds {}",self.n_elements(),MAX_TABLE_ELEMENTS);
        }
        let mut w = BufWriter::new(writer);
        writeln!(w,"{}",low16)?;
        writeln!(w,"{}",high16)?;
        for c in &self.coords {
            writeln!(w,"{}",c.k_phase)?;
            writeln!(w,"{}",c.k_slice)?;
        }
        w.flush()?;
        Ok(())
    }

    pub fn to_lut_string(&self) -> Result<String> {
        let mut buf = Vec::<u8>::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn write(&self,dest:&Path) -> Result<()> {
        let f = File::create(dest)?;
        self.write_to(f)
    }
}

fn fits_i16(v:i32) -> bool {
    v >= i16::MIN as i32 && v <= i16::MAX as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(k_phase:i32,k_slice:i32) -> KspaceCoord {
        KspaceCoord{k_phase,k_slice}
    }

    #[test]
    fn count_split() {
        assert_eq!(split32to16(1313),(1313,0));
        assert_eq!(split32to16(40000),(-25536,0));
        assert_eq!(split32to16(0),(0,0));
        assert_eq!(split32to16(65536),(0,1));
        assert_eq!(split32to16(u32::MAX),(-1,65535));
        for n in [0u32,1,32767,32768,65535,65536,70000,196095,1<<31,u32::MAX] {
            let (l,h) = split32to16(n);
            assert_eq!(join16to32(l,h),n);
        }
    }

    #[test]
    fn lut_text() {
        let t = CSTable::from_samples(&[coord(-1,2),coord(0,-3)]);
        assert_eq!(t.to_lut_string().unwrap(),"2\n0\n-1\n2\n0\n-3\n");
        let empty = CSTable::from_samples(&[]);
        assert_eq!(empty.to_lut_string().unwrap(),"0\n0\n");
    }

    #[test]
    fn coordinate_out_of_range() {
        let t = CSTable::from_samples(&[coord(0,0),coord(32768,0)]);
        assert!(matches!(t.to_lut_string(),Err(CsTableError::Encoding(_))));
        let t = CSTable::from_samples(&[coord(-32768,32767)]);
        assert_eq!(t.to_lut_string().unwrap(),"1\n0\n-32768\n32767\n");
    }

    #[test]
    fn parse_lut() {
        let t = CSTable::parse("2\n0\n-1\n2\n0\n-3\n").unwrap();
        assert_eq!(t.n_views(),2);
        assert_eq!(t.n_elements(),4);
        assert_eq!(t.coordinates(),&[coord(-1,2),coord(0,-3)]);
        assert_eq!(t.indices([8,8]),vec![(3,6),(4,1)]);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!(CSTable::parse(""),Err(CsTableError::Parse(_))));
        assert!(matches!(CSTable::parse("1\n0\n4\n"),Err(CsTableError::Parse(_))));
        assert!(matches!(CSTable::parse("2\n0\n4\n4\n"),Err(CsTableError::Parse(_))));
        assert!(matches!(CSTable::parse("1\n0\nx\n4\n"),Err(CsTableError::Parse(_))));
        assert!(matches!(CSTable::parse("40000\n0\n"),Err(CsTableError::Parse(_))));
    }
}
