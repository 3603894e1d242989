use std::path::{Path, PathBuf};
use std::fs::{create_dir_all, File};
use std::io::{self, Write, Read};
use glob::glob;

pub fn read_to_string(filepath:&Path,extension:&str) -> io::Result<String> {
    let p = filepath.with_extension(extension);
    let mut f = File::open(&p)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    Ok(s)
}

pub fn write_to_file(filepath:&Path,extension:&str,string:&str) -> io::Result<PathBuf> {
    let p = filepath.with_extension(extension);
    let mut f = File::create(&p)?;
    f.write_all(string.as_bytes())?;
    Ok(p)
}

/// create the directory (and parents) if it isn't there yet
pub fn create_dir(dir:&Path) -> io::Result<()> {
    match dir.exists() {
        true => Ok(()),
        false => create_dir_all(dir)
    }
}

pub fn get_first_match(dir:&Path,pattern:&str) -> Option<PathBuf>  {
    get_all_matches(dir,pattern).and_then(|m| m.into_iter().next())
}

// single depth search, sorted
pub fn get_all_matches(dir:&Path,pattern:&str) -> Option<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(dir.to_str()?);
    let pat = Path::new(&escaped).join(pattern);
    let pat = pat.to_str()?;
    let mut matches:Vec<PathBuf> = glob(pat).ok()?.flat_map(|m| m).collect();
    matches.sort();
    match matches.is_empty() {
        true => None,
        false => Some(matches)
    }
}

#[test]
fn test(){
    let dir = std::env::temp_dir().join("utils_test").join("nested");
    create_dir(&dir).unwrap();
    let p = write_to_file(&dir.join("b_file"),"txt","hello").unwrap();
    write_to_file(&dir.join("a_file"),"txt","world").unwrap();
    assert_eq!(p,dir.join("b_file.txt"));
    assert_eq!(read_to_string(&dir.join("b_file"),"txt").unwrap(),"hello");
    assert_eq!(get_first_match(&dir,"*_file.txt"),Some(dir.join("a_file.txt")));
    assert!(get_all_matches(&dir,"*.none").is_none());

    // glob metacharacters in the directory name are taken literally
    let odd = std::env::temp_dir().join("utils_test").join("scan[1]");
    create_dir(&odd).unwrap();
    write_to_file(&odd.join("lut"),"txt","1").unwrap();
    assert_eq!(get_first_match(&odd,"*.txt"),Some(odd.join("lut.txt")));
}
