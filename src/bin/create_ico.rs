use clap::{App, Arg};
use std::io;
use std::path::PathBuf;

//===========================================================================//

fn main() -> io::Result<()> {
    let matches = App::new("create_ico")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Writes a blank 32x32 placeholder icon.ico")
        .arg(
            Arg::with_name("output-dir")
                .takes_value(true)
                .value_name("DIR")
                .short("o")
                .long("output-dir")
                .help("Sets the directory to write into (default: .)"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Logs every record as it is emitted"),
        )
        .get_matches();
    placeholder_icons::logging::init(matches.is_present("verbose"))?;
    let out_dir = PathBuf::from(matches.value_of("output-dir").unwrap_or("."));
    placeholder_icons::write_icon(&out_dir)?;
    println!("ICO file created successfully");
    Ok(())
}

//===========================================================================//
