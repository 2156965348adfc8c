use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use crate::{
    terrain::{locate, DataFolder, Dataset},
    utils::GeodeticPoint,
    view::params::parse_arg,
    Error, Result,
};

pub const SUBCOMMAND: &str = "tile";

fn required<T: std::str::FromStr>(matches: &ArgMatches<'_>, name: &'static str) -> Result<T> {
    parse_arg(matches, name)?.ok_or_else(|| Error::InvalidArgument {
        name,
        value: String::new(),
    })
}

pub fn run(matches: &ArgMatches<'_>) -> Result<()> {
    let point = GeodeticPoint::new(
        required(matches, "latitude")?,
        required(matches, "longitude")?,
    )?;
    let dataset: Dataset = parse_arg(matches, "dataset")?.unwrap_or_default();
    let folder = DataFolder::new(matches.value_of("data").unwrap_or("./data"));

    let id = locate(point);
    let files = folder.tile_files(&id, dataset);

    println!("Prefix: {}", id.prefix);
    println!("Tile: {}", id.name);
    println!("Image: {}", id.image_file_name(dataset));
    println!("Label: {}", id.label_file_name(dataset));
    println!("Image URL: {}", files.image_url);
    println!("Label URL: {}", files.label_url);
    println!(
        "Local copy in {:?}: {}",
        folder.root(),
        if files.is_present() {
            "present"
        } else {
            "missing"
        }
    );

    Ok(())
}

pub fn subcommand_def() -> App<'static, 'static> {
    SubCommand::with_name(SUBCOMMAND)
        .about("Print the archive tile holding a point")
        .setting(AppSettings::AllowNegativeNumbers)
        .arg(
            Arg::with_name("latitude")
                .help("Latitude in degrees, north positive")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("longitude")
                .help("East longitude in degrees")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("data")
                .short("d")
                .long("data")
                .value_name("PATH")
                .help("Folder with downloaded archive tiles (./data assumed if none)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("dataset")
                .long("dataset")
                .value_name("NAME")
                .help("Archive product: dtm or ortho (default: dtm)")
                .takes_value(true),
        )
}
