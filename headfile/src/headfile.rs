use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path,PathBuf};

pub struct Headfile{
    file:PathBuf
}

impl Headfile{

    pub fn new(file_path:&Path) -> io::Result<Self> {
        File::create(file_path)?;
        Ok(Self {
            file:file_path.to_owned()
        })
    }

    pub fn open(file_path:&Path) -> io::Result<Self> {
        match file_path.exists() {
            false => Headfile::new(file_path),
            true => Ok(Self{
                file:file_path.to_owned()
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    pub fn read(&self) -> io::Result<HashMap<String,String>> {
        let mut f = File::open(&self.file)?;
        let mut s = String::new();
        f.read_to_string(&mut s)?;
        Ok(Self::txt_to_hash(&s))
    }

    /// merge fields into the file, new values win
    pub fn append(&self,hash:&HashMap<String,String>) -> io::Result<()> {
        let h1 = Self::merge(self.read()?,hash.clone());
        let txt = Self::hash_to_txt(&h1);
        let mut f = File::create(&self.file)?;
        f.write_all(txt.as_bytes())
    }

    fn merge(map1:HashMap<String,String>,map2:HashMap<String,String>) -> HashMap<String,String> {
        map1.into_iter().chain(map2).collect()
    }

    // keys are written sorted so files diff cleanly
    pub fn hash_to_txt(hash:&HashMap<String,String>) -> String {
        let mut keys:Vec<&String> = hash.keys().collect();
        keys.sort();
        let mut strbuf = String::new();
        for key in keys {
            strbuf.push_str(key);
            strbuf.push('=');
            strbuf.push_str(&hash[key]);
            strbuf.push('\n');
        }
        strbuf
    }

    fn txt_to_hash(headfile_str:&str) -> HashMap<String,String>{
        let mut hf = HashMap::<String,String>::new();
        headfile_str.lines().for_each(|line|{
            // split on the first = we find
            if let Some((key,val)) = line.split_once('=') {
                hf.insert(key.to_string(),val.to_string());
            }
        });
        hf
    }
}

#[test]
fn test(){
    let dir = std::env::temp_dir().join("headfile_test");
    std::fs::create_dir_all(&dir).unwrap();
    let p = dir.join("lut.headfile");
    let h = Headfile::new(&p).unwrap();
    let mut fields = HashMap::<String,String>::new();
    fields.insert(String::from("grappa_ry"),String::from("2"));
    fields.insert(String::from("equation"),String::from("a=b"));
    h.append(&fields).unwrap();
    let mut update = HashMap::<String,String>::new();
    update.insert(String::from("grappa_ry"),String::from("3"));
    Headfile::open(&p).unwrap().append(&update).unwrap();
    let back = h.read().unwrap();
    assert_eq!(back.get("grappa_ry").map(|s| s.as_str()),Some("3"));
    assert_eq!(back.get("equation").map(|s| s.as_str()),Some("a=b"));
    assert_eq!(std::fs::read_to_string(&p).unwrap(),"equation=a=b\ngrappa_ry=3\n");
}
