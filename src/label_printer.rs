use clap::{App, Arg, ArgMatches, SubCommand};

use crate::{
    terrain::{Label, LabelKey, TileGeometry},
    Error, Result,
};

pub const SUBCOMMAND: &str = "label";

pub fn run(matches: &ArgMatches<'_>) -> Result<()> {
    let filename = matches.value_of("input").ok_or(Error::InvalidArgument {
        name: "input",
        value: String::new(),
    })?;

    let label = Label::from_file(filename)?;
    for line in describe(&label) {
        println!("{}", line);
    }
    Ok(())
}

fn describe(label: &Label) -> Vec<String> {
    let mut lines: Vec<String> = LabelKey::ALL
        .iter()
        .map(|&key| match label.get(key) {
            Some(value) => format!("{} = {}", key, value),
            None => format!("{} = (missing)", key),
        })
        .collect();

    match TileGeometry::from_label(label) {
        Ok(geometry) => {
            let (min_lat, max_lon) = geometry.lower_right();
            lines.push(format!(
                "Coverage: latitude {} .. {}, longitude {} .. {}",
                min_lat,
                geometry.upper_left.latitude(),
                geometry.upper_left.longitude(),
                max_lon
            ));
        }
        Err(err) => lines.push(format!("No usable geometry: {}", err)),
    }
    lines
}

pub fn subcommand_def() -> App<'static, 'static> {
    SubCommand::with_name(SUBCOMMAND)
        .about("Print the geometry entries of a raster label")
        .arg(
            Arg::with_name("input")
                .help("Path to the label file")
                .required(true)
                .index(1),
        )
}
