use clap::{arg,crate_version,Command};
use cmpr::{CodecId,compress_buffer,decompress_buffer};
use std::path::Path;

const RCH: &str = "unreachable was reached";

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {}",e);
        std::process::exit(1);
    }
}

fn run() -> Result<(),Box<dyn std::error::Error>>
{
    let long_help =
"Examples:
---------
Compress:      `cmpr compress -m lzw -i notes.txt -o notes.cmp`
Expand:        `cmpr expand -i notes.cmp -o notes.txt`

The expanded file's name can be left off, the container remembers the
original extension.";

    let methods = ["rle","huffman","lzw"];

    let mut main_cmd = Command::new("cmpr")
        .about("Compress and expand files with RLE, Huffman, or LZW")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-m --method [METHOD] "compression algorithm").value_parser(methods)
            .default_value("lzw"))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output [PATH] "output path, defaults to the input path plus `.cmp`"))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output [PATH] "output path, defaults to the input stem plus the stored extension"))
        .about("expand a compressed file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let method = cmd.get_one::<String>("method").expect(RCH);
        let path_out = match cmd.get_one::<String>("output") {
            Some(path) => path.clone(),
            None => [path_in.as_str(),".cmp"].concat()
        };
        let codec = CodecId::resolve(method)?;
        let dat = std::fs::read(path_in)?;
        let ext = match Path::new(path_in).extension() {
            Some(ext) => [".",ext.to_string_lossy().as_ref()].concat(),
            None => String::new()
        };
        let compressed = compress_buffer(&dat,codec,&ext)?;
        eprintln!("compressed {} into {} bytes",dat.len(),compressed.len());
        std::fs::write(path_out,compressed)?;
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let dat = std::fs::read(path_in)?;
        let (ext,expanded) = decompress_buffer(&dat)?;
        let path_out = match cmd.get_one::<String>("output") {
            Some(path) => path.clone(),
            None => {
                // the extension hint from compression time names the output
                let stem = Path::new(path_in).with_extension("");
                match ext.is_empty() {
                    true => [stem.to_string_lossy().as_ref(),".out"].concat(),
                    false => [stem.to_string_lossy().as_ref(),ext.as_str()].concat()
                }
            }
        };
        eprintln!("expanded {} into {} bytes",dat.len(),expanded.len());
        std::fs::write(path_out,expanded)?;
    }

    Ok(())
}
