use clap::{arg,crate_version,value_parser,Command};
use std::path::{Path,PathBuf};
use ceym::lzw;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

const RCH: &str = "unreachable was reached";
const EXT_PACKED: &str = "ceym";
const EXT_UNPACKED: &str = "u";

fn ok_to_overwrite(path_out: &Path) -> bool {
    if path_out.exists() {
        let mut ans = String::new();
        eprint!("{} exists, overwrite? (y/n) ",path_out.display());
        if std::io::stdin().read_line(&mut ans).is_err() {
            return false;
        }
        return ans.trim_end()=="y" || ans.trim_end()=="Y";
    }
    true
}

/// packing appends the packed extension, unpacking swaps it for the unpacked one
fn default_output(path_in: &Path,unpack: bool) -> PathBuf {
    let has_packed_ext = path_in.extension().map_or(false,|ext| ext==EXT_PACKED);
    if unpack && has_packed_ext {
        return path_in.with_extension(EXT_UNPACKED);
    }
    let mut name = path_in.as_os_str().to_owned();
    name.push(".");
    name.push(match unpack {
        true => EXT_UNPACKED,
        false => EXT_PACKED
    });
    PathBuf::from(name)
}

fn run() -> STDRESULT
{
    let long_help =
"Examples:
---------
Pack:          `ceym my_file` (creates my_file.ceym)
Unpack:        `ceym -u my_file.ceym -o my_file`
Wider codes:   `ceym -C 16 my_file` (unpack with the same -C)";

    let main_cmd = Command::new("ceym")
        .about("Pack and unpack files with the LZW algorithm")
        .after_long_help(long_help)
        .version(crate_version!())
        .arg(arg!(<INPUT> "the file to pack or unpack"))
        .arg(arg!(-u --unpack "unpack instead of pack"))
        .arg(arg!(-o --output <PATH> "output path, derived from the input path if omitted"))
        .arg(arg!(-C --"code-length" <BITS> "code length in bits, must be the same for packing and unpacking")
            .value_parser(value_parser!(usize))
            .default_value("12"));

    let matches = main_cmd.get_matches();

    let path_in = PathBuf::from(matches.get_one::<String>("INPUT").expect(RCH));
    let unpack = matches.get_flag("unpack");
    let path_out = match matches.get_one::<String>("output") {
        Some(p) => PathBuf::from(p),
        None => default_output(&path_in,unpack)
    };
    let opt = lzw::Options::with_code_width(*matches.get_one::<usize>("code-length").expect(RCH));
    opt.validate()?;
    if path_out == path_in {
        return Err(format!("output {} would overwrite the input",path_out.display()).into());
    }
    if !ok_to_overwrite(&path_out) {
        return Err("operation aborted".into());
    }
    log::debug!("{} to {}",path_in.display(),path_out.display());
    let mut in_file = std::fs::File::open(&path_in)
        .map_err(|e| format!("cannot open {}: {}",path_in.display(),e))?;
    let mut out_file = std::fs::File::create(&path_out)
        .map_err(|e| format!("cannot create {}: {}",path_out.display(),e))?;
    let result = match unpack {
        true => lzw::decompress(&mut in_file,&mut out_file,&opt),
        false => lzw::compress(&mut in_file,&mut out_file,&opt)
    };
    match result {
        Ok((in_size,out_size)) => {
            eprintln!("{} {} into {}",if unpack {"unpacked"} else {"packed"},in_size,out_size);
            Ok(())
        },
        Err(e) => {
            // partial output is useless
            drop(out_file);
            if let Err(rm_err) = std::fs::remove_file(&path_out) {
                log::warn!("could not remove {}: {}",path_out.display(),rm_err);
            }
            Err(Box::new(e))
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(e) = run() {
        eprintln!("error: {}",e);
        std::process::exit(1);
    }
}
