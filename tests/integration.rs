use std::{fs, io::Write, path::Path};

use approx::assert_relative_eq;

use lunar_view::{
    correct, extract, locate, view, Error, GeodeticPoint, Label, RangeCode, RasterTile,
    TileGeometry,
};

// LRO NAC DTM of the Apollo 17 landing site
fn apollo17_geometry() -> TileGeometry {
    TileGeometry::new(
        11600,
        9985,
        GeodeticPoint::corner(21.3033847, 29.905747).unwrap(),
        6064.67008483,
    )
    .unwrap()
}

fn write_tile(dir: &Path, lines: usize, line_samples: usize) -> (String, String) {
    let label = dir.join("tile.lbl");
    fs::write(
        &label,
        format!(
            "PDS_VERSION_ID = PDS3\n\
             OBJECT = IMAGE\n\
             \x20 LINES = {}\n\
             \x20 LINE_SAMPLES = {}\n\
             \x20 BANDS = 1\n\
             \x20 SAMPLE_BITS = 16\n\
             END_OBJECT = IMAGE\n\
             OBJECT = IMAGE_MAP_PROJECTION\n\
             \x20 MAP_RESOLUTION = 100.0 <pix/deg>\n\
             \x20 UPPER_LEFT_LATITUDE = 21.0 <deg>\n\
             \x20 UPPER_LEFT_LONGITUDE = 30.0 <deg>\n\
             END_OBJECT = IMAGE_MAP_PROJECTION\n\
             END\n",
            lines, line_samples
        ),
    )
    .unwrap();

    let image = dir.join("tile.img");
    let mut file = fs::File::create(&image).unwrap();
    for i in 0..lines {
        for j in 0..line_samples {
            let value = -1000 + (i + j) as i16;
            file.write_all(&value.to_be_bytes()).unwrap();
        }
    }

    (
        label.to_str().unwrap().to_owned(),
        image.to_str().unwrap().to_owned(),
    )
}

#[test]
fn apollo17_window_selection() {
    let geometry = apollo17_geometry();
    let target = GeodeticPoint::new(20.1741, 30.5662).unwrap();
    let selection = geometry.select(target, RangeCode::Wide.half_width());

    assert!(!selection.is_empty());
    let (rows, cols) = selection.shape();
    // 0.2° at ~6065 px/deg
    assert!(rows > 1200 && rows < 1215);
    assert!(cols > 1200 && cols < 1215);

    for &j in &[selection.cols.start, selection.cols.end - 1] {
        let lon = geometry.longitude(j);
        assert!(lon >= 30.4662 - 1e-9 && lon <= 30.6662 + 1e-9);
    }
    for &i in &[selection.rows.start, selection.rows.end - 1] {
        let lat = geometry.latitude(i);
        assert!(lat >= 20.0741 - 1e-9 && lat <= 20.2741 + 1e-9);
    }
}

#[test]
fn apollo17_tile_name() {
    let tile = locate(GeodeticPoint::new(20.1741, 30.5662).unwrap());
    assert_eq!(tile.prefix, "lon030");
    assert_eq!(tile.name, "N21E030N18E033");
}

#[test]
fn label_to_apparent_elevation() {
    let dir = tempfile::tempdir().unwrap();
    let (label_path, image_path) = write_tile(dir.path(), 50, 60);

    let geometry = TileGeometry::from_label(&Label::from_file(&label_path).unwrap()).unwrap();
    assert_eq!(geometry.shape(), (50, 60));

    let tile = RasterTile::<i16>::from_file(&image_path, geometry).unwrap();
    // row 20, column 30 is exactly on a sample
    let target = GeodeticPoint::new(20.8, 30.3).unwrap();
    let window = extract(&tile, target, RangeCode::Medium).unwrap();
    let apparent = correct(&window, target).unwrap();

    assert_eq!(apparent.shape(), window.shape());
    assert_eq!(window.latitude().shape(), window.shape());
    assert_eq!(window.longitude().shape(), window.shape());

    let (row_offset, col_offset) = window.offset();
    let (ci, cj) = (20 - row_offset, 30 - col_offset);
    assert_relative_eq!(*window.latitude().get(ci, cj).unwrap(), 20.8, epsilon = 1e-9);
    assert_relative_eq!(*window.longitude().get(ci, cj).unwrap(), 30.3, epsilon = 1e-9);

    let raw = f64::from(*window.elevation().get(ci, cj).unwrap());
    assert_eq!(raw, -950.0);
    assert_relative_eq!(*apparent.get(ci, cj).unwrap(), raw, epsilon = 1e-6);

    for (r, a) in window.elevation().as_slice().iter().zip(apparent.as_slice()) {
        assert!(*a <= f64::from(*r));
    }
}

#[test]
fn target_outside_raster() {
    let dir = tempfile::tempdir().unwrap();
    let (label_path, image_path) = write_tile(dir.path(), 20, 20);
    let geometry = TileGeometry::from_label(&Label::from_file(&label_path).unwrap()).unwrap();
    let tile = RasterTile::<i16>::from_file(&image_path, geometry).unwrap();

    let target = GeodeticPoint::new(10.0, 100.0).unwrap();
    assert!(matches!(
        extract(&tile, target, RangeCode::Close),
        Err(Error::OutOfBounds { .. })
    ));
}

#[test]
fn truncated_raster_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (label_path, image_path) = write_tile(dir.path(), 10, 10);
    let geometry = TileGeometry::from_label(&Label::from_file(&label_path).unwrap()).unwrap();
    let bigger = TileGeometry::new(11, 10, geometry.upper_left, geometry.resolution).unwrap();

    match RasterTile::<i16>::from_file(&image_path, bigger) {
        Err(Error::RasterSize {
            expected, actual, ..
        }) => {
            assert_eq!(expected, 220);
            assert_eq!(actual, 200);
        }
        other => panic!("unexpected: {:?}", other.map(|t| t.geometry().shape())),
    }
}

#[test]
fn metadata_round_trip_through_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let (label_path, image_path) = write_tile(dir.path(), 30, 30);
    let geometry = TileGeometry::from_label(&Label::from_file(&label_path).unwrap()).unwrap();
    let tile = RasterTile::<i16>::from_file(&image_path, geometry).unwrap();
    let target = GeodeticPoint::new(20.85, 30.15).unwrap();

    let window = extract(&tile, target, RangeCode::Close).unwrap();
    let data = view::ViewData {
        target,
        range: RangeCode::Close,
        apparent: correct(&window, target).unwrap(),
        window: window.to_f64(),
    };

    let path = dir
        .path()
        .join(format!("{}.bin.gz", view::output_stem(target, RangeCode::Close)));
    view::write_metadata(&path, &data).unwrap();
    assert!(path.ends_with("LV_03_N2085000E03015000.bin.gz"));
    assert_eq!(view::read_metadata(&path).unwrap(), data);
}

#[test]
fn sample_configs_parse() {
    for name in &["configs/apollo17.yaml", "configs/slim.yaml"] {
        let params = view::params::parse_config(name)
            .unwrap()
            .into_params()
            .unwrap();
        let geometry = params.raster.geometry.load().unwrap();
        let selection = geometry.select(params.target, params.range.half_width());
        assert!(!selection.is_empty(), "{}", name);
    }
}
