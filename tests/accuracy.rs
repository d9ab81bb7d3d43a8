use geoscale::{
    angle::{to_decimal_degrees, Direction},
    utm::{central_meridian, zone_from_longitude},
    BatchOutcome, BatchRecord, BatchRunner, Error, Hemisphere, ScaleFactorCalculator, TransverseMercator, UtmPoint,
    UtmProjection,
};

#[test]
fn dms_reference_point() {
    let lat = to_decimal_degrees(36., 30., 35.05, Direction::North);
    let lon = to_decimal_degrees(1., 18., 15.87, Direction::East);

    let factors = ScaleFactorCalculator::wgs84().compute(lat, lon, 59.595).unwrap();

    assert_eq!(factors.zone(), 31);
    assert_eq!(factors.hemisphere(), Hemisphere::North);
    assert!((factors.easting() - 348_163.32).abs() < 0.01);
    assert!((factors.northing() - 4_041_824.97).abs() < 0.01);
    assert!((factors.combined_scale_factor() - 0.999_874_692_048).abs() < 1e-6);
}

#[test]
fn utm_entry_matches_geographic_entry() {
    let calculator = ScaleFactorCalculator::wgs84();
    let utm = UtmPoint::create(31, Hemisphere::North, 348_163.320, 4_041_824.970).unwrap();

    let from_utm = calculator.compute_from_utm(&utm, 59.595).unwrap();
    let from_geo = calculator
        .compute(from_utm.latitude(), from_utm.longitude(), 59.595)
        .unwrap();

    assert!((from_utm.grid_scale_factor() - from_geo.grid_scale_factor()).abs() < 1e-12);
    assert!((from_utm.height_scale_factor() - from_geo.height_scale_factor()).abs() < 1e-12);
    assert!((from_utm.combined_scale_factor() - 0.999_874_692_048).abs() < 1e-6);
}

// Forward then inverse over the usable UTM band, in each point's own zone.
#[test]
fn projection_round_trip() {
    let tm = TransverseMercator::wgs84();

    let mut worst = 0f64;
    for lat_step in -79..=79 {
        let lat = f64::from(lat_step) + 0.25;
        for lon_step in -36..36 {
            let lon = f64::from(lon_step) * 5. + 1.7;
            let zone = zone_from_longitude(lon);
            let hemisphere = Hemisphere::from_latitude(lat);

            let (easting, northing) = tm.forward(zone, hemisphere, lat, lon);
            let (lat2, lon2) = tm.inverse(zone, hemisphere, easting, northing);

            worst = worst.max((lat2 - lat).abs()).max((lon2 - lon).abs());
        }
    }

    assert!(worst < 1e-6, "worst round trip error {worst}");
}

#[test]
fn zone_derivation() {
    assert_eq!(zone_from_longitude(1.3), 31);
    assert_eq!(zone_from_longitude(-179.9), 1);
    assert_eq!(zone_from_longitude(179.9), 60);
    assert_eq!(zone_from_longitude(180.), 60);
    assert_eq!(zone_from_longitude(0.), 31);
    assert_eq!(central_meridian(31), 3.);
}

#[test]
fn factors_behave_monotonically() {
    let calculator = ScaleFactorCalculator::wgs84();

    // Higher points shrink more when brought to the ellipsoid
    let mut last = f64::INFINITY;
    for height in [-400., 0., 100., 1_000., 4_000.] {
        let combined = calculator.compute(45., 9., height).unwrap().combined_scale_factor();
        assert!(combined < last, "{height}");
        last = combined;
    }

    // Grid distortion grows away from the central meridian of zone 32 (9°E)
    let mut last = 0.;
    for lon in [9., 9.5, 10.5, 11.5] {
        let grid = calculator.compute(45., lon, 0.).unwrap().grid_scale_factor();
        assert!(grid > last, "{lon}");
        last = grid;
    }
}

#[test]
fn batch_with_a_bad_row() {
    let calculator = ScaleFactorCalculator::wgs84();
    let runner = BatchRunner::projected(&calculator, 31, Hemisphere::North).unwrap();

    let records = [
        BatchRecord::new("1", 348_163.320, 4_041_824.970, 59.595),
        BatchRecord::new("2", 348_200.500, 4_041_900.000, "abc"),
        BatchRecord::new("3", 350_000.000, 4_042_000.000, 12.0),
    ];

    let report = runner.run(&records);

    assert_eq!(report.len(), 3);
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failure_count(), 1);

    let rows: Vec<usize> = report.outcomes().iter().map(BatchOutcome::row).collect();
    assert_eq!(rows, vec![1, 2, 3]);

    let failure = report.failures().next().unwrap();
    assert_eq!(failure.row, 2);
    assert_eq!(failure.id, "2");
    assert!(matches!(failure.error, Error::InvalidField { field: "height", .. }));

    let first = report.rows().next().unwrap();
    assert_eq!(first.id, "1");
    assert_eq!(first.easting, 348_163.320);
    assert!((first.combined_scale_factor - 0.999_874_692_048).abs() < 1e-6);
}
