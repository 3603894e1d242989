pub mod headfile;
