use clap::{App, Arg};
use placeholder_icons::IdatPayload;
use std::io;
use std::path::PathBuf;

//===========================================================================//

fn main() -> io::Result<()> {
    let matches = App::new("create_placeholders")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Writes placeholder 32x32, 128x128, and 128x128@2x PNG files")
        .arg(
            Arg::with_name("output-dir")
                .takes_value(true)
                .value_name("DIR")
                .short("o")
                .long("output-dir")
                .help("Sets the directory to write into (default: .)"),
        )
        .arg(
            Arg::with_name("decodable")
                .long("decodable")
                .help("Writes black pixel data that matches each size"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Logs every chunk as it is emitted"),
        )
        .get_matches();
    placeholder_icons::logging::init(matches.is_present("verbose"))?;
    let out_dir = PathBuf::from(matches.value_of("output-dir").unwrap_or("."));
    let payload = if matches.is_present("decodable") {
        IdatPayload::Blank
    } else {
        IdatPayload::Stub
    };
    placeholder_icons::write_placeholders(&out_dir, payload)?;
    println!("PNG files created successfully");
    Ok(())
}

//===========================================================================//
