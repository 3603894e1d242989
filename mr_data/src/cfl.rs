use std::collections::HashMap;
use std::path::{Path,PathBuf};
use std::fs::File;
use std::io::{self,Read,Write};
use byteorder::{ByteOrder,LittleEndian};
use ndarray::{Array2, ShapeBuilder};
use num_complex::Complex;

/*
    BART stores arrays column-major with the readout dimension first. A ky-kz
    sampling pattern is therefore written as 1 x ky x kz, ky varying fastest.
 */

pub fn get_dims(cfl_base:&Path) -> io::Result<Vec<usize>> {
    let h = load_cfl_header(cfl_base)?;
    let d = h.get("# Dimensions").ok_or_else(|| invalid("couldn't find # Dimensions"))?;
    d.split_whitespace().map(|s| s.parse::<usize>().map_err(|_| invalid("dimension is not an integer"))).collect()
}

pub fn load_cfl_header(cfl_base:&Path) -> io::Result<HashMap<String,String>> {
    let (hdr,_) = cfl_base_decode(cfl_base);
    let mut f = File::open(&hdr)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    let mut h = HashMap::<String,String>::new();
    let lines:Vec<&str> = s.lines().collect();
    lines.iter().enumerate().for_each( |(i,line)|
    {
        if line.starts_with('#') {
            if let Some(val) = lines.get(i+1) {
                h.insert(line.to_string(),val.to_string());
            }
        }
    });
    Ok(h)
}

pub fn write_cfl_header(dims:&[usize],cfl_base:&Path) -> io::Result<()> {
    let (hdr,_) = cfl_base_decode(cfl_base);
    let mut hdr = File::create(hdr)?;
    let dim_str:Vec<String> = dims.iter().map(|d| d.to_string()).collect();
    let hdr_str = format!("# Dimensions\n{}\n",dim_str.join(" "));
    hdr.write_all(hdr_str.as_bytes())
}

/// write a ky x kz sampling mask as a 1 x ky x kz x 1 x 1 cfl pair
pub fn write_mask(mask:&Array2<bool>,cfl_base:&Path) -> io::Result<()> {
    let (ky,kz) = mask.dim();
    // walking the transpose row-major visits the mask column-major
    let vals:Vec<Complex<f32>> = mask.t().iter().map(|m| match *m {
        true => Complex::new(1.0,0.0),
        false => Complex::new(0.0,0.0)
    }).collect();
    let flat:Vec<f32> = vals.iter().flat_map(|c| [c.re,c.im]).collect();
    write_data(&flat,cfl_base)?;
    write_cfl_header(&[1,ky,kz,1,1],cfl_base)
}

/// read a mask written with write_mask. Any non-zero sample counts as acquired.
pub fn read_mask(cfl_base:&Path) -> io::Result<Array2<bool>> {
    let dims = get_dims(cfl_base)?;
    if dims.len() < 3 || dims[0] != 1 || dims[3..].iter().any(|d| *d != 1) {
        return Err(invalid(&format!("not a 1 x ky x kz pattern: {:?}",dims)));
    }
    let (ky,kz) = (dims[1],dims[2]);
    let (_,cfl) = cfl_base_decode(cfl_base);
    let flat = load(&cfl)?;
    if flat.len() != 2*ky*kz {
        return Err(invalid(&format!("expected {} floats, found {}",2*ky*kz,flat.len())));
    }
    let sampled:Vec<bool> = flat.chunks_exact(2).map(|c| Complex::new(c[0],c[1]).norm() != 0.0).collect();
    Array2::from_shape_vec((ky,kz).f(),sampled).map_err(|e| invalid(&e.to_string()))
}

pub fn load(cfl:&Path) -> io::Result<Vec<f32>> {
    let mut f = File::open(cfl)?;
    let mut buf = Vec::<u8>::new();
    f.read_to_end(&mut buf)?;
    if buf.len() % 4 != 0 {
        return Err(invalid("cfl size is not a multiple of 4 bytes"));
    }
    let mut fbuf:Vec<f32> = vec![0.0;buf.len()/4];
    LittleEndian::read_f32_into(&buf,&mut fbuf);
    Ok(fbuf)
}

pub fn write_data(flat:&[f32], cfl_base:&Path) -> io::Result<()> {
    let (_,cfl) = cfl_base_decode(cfl_base);
    let n_bytes = flat.len()*4;
    let mut byte_buff:Vec<u8> = vec![0;n_bytes];
    LittleEndian::write_f32_into(flat,&mut byte_buff);
    let mut cfl = File::create(cfl)?;
    cfl.write_all(&byte_buff)
}

pub fn cfl_base_decode(cfl_base:&Path) -> (PathBuf,PathBuf) {
    (cfl_base.with_extension("hdr"),cfl_base.with_extension("cfl"))
}

fn invalid(msg:&str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData,msg.to_string())
}
