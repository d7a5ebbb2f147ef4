mod tests {
    use myrtio_daylight::solar::{AMSTERDAM, LAST_INDEX, SolarTable};

    #[test]
    fn test_table_is_sane() {
        for [sunrise, sunset] in AMSTERDAM {
            assert!(sunrise < sunset);
            assert!(sunset < 24 * 60);
        }
    }

    #[test]
    fn test_summer_days_are_longer() {
        let table = SolarTable::default();
        let winter = table.lookup(0);
        let summer = table.lookup(171);
        assert!(summer.sunrise < winter.sunrise);
        assert!(summer.sunset > winter.sunset);
    }

    #[test]
    fn test_lookup_clamps_index() {
        let table = SolarTable::default();
        assert_eq!(table.lookup(999), table.lookup(LAST_INDEX));
        assert_eq!(table.lookup(366), table.lookup(365));
    }

    #[test]
    fn test_custom_table() {
        static FLAT: [[u16; 2]; 366] = [[360, 1080]; 366];
        let table = SolarTable::new(&FLAT);
        let entry = table.lookup(42);
        assert_eq!(entry.sunrise, 360);
        assert_eq!(entry.sunset, 1080);
    }
}
