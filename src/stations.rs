//! Monitoring station catalog.

use serde::Serialize;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Station {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    /// Operated by the buoy project, as opposed to partner stations.
    pub buoy: bool,
}

const fn buoy(name: &'static str, latitude: f64, longitude: f64) -> Station {
    Station {
        name,
        latitude,
        longitude,
        buoy: true,
    }
}

const fn partner(name: &'static str, latitude: f64, longitude: f64) -> Station {
    Station {
        name,
        latitude,
        longitude,
        buoy: false,
    }
}

pub const STATIONS: &[Station] = &[
    buoy("Vĩnh Long", 10.099_833, 106.208_306),
    buoy("Cần Giờ", 10.598_092, 106.807_946),
    buoy("VGU", 11.108_438_972, 106.613_894_203),
    partner("An Thuận", 9.976_388_889, 106.605_022_2),
    partner("Trà Kha", 9.623_059_755, 106.249_834_1),
    partner("Cầu Quan", 9.755_832_963, 106.113_985_8),
    partner("Trà Vinh", 9.976_579_766, 106.355_459_3),
    partner("Hưng Mỹ", 9.885_625_852, 106.450_951_5),
    partner("Bến Trại", 9.883_471_894, 106.524_104_7),
    partner("Lộc Thuận", 10.244_361_42, 106.603_056_1),
    partner("Sơn Đốc", 10.053_258_88, 106.463_809_5),
    partner("Bình Đại", 10.205_373_43, 106.707_746_6),
    partner("An Định", 10.312_258_5, 106.429_222_2),
    partner("Hòa Bình", 10.289_362_44, 106.592_381_1),
    partner("Vàm Kênh", 10.272_647_36, 106.736_791_1),
    partner("Đồng Tâm", 10.329_834, 106.334_365),
    partner("Hương Mỹ", 9.983_307, 106.383_335),
    partner("Tân An", 10.541_787_82, 106.415_794_2),
    partner("Tuyên Nhơn", 10.658_844_33, 106.193_757_6),
    partner("Bến Lức", 10.636_772_95, 106.474_421_5),
    partner("Cầu Nối", 10.418_729_22, 106.572_373_5),
    partner("Xuân Khánh", 10.841_952_1, 106.350_741_8),
    partner("Mỹ Tho", 10.346_891_61, 106.346_989_3),
    partner("Thạnh Phú", 9.498_933_823, 105.857_877),
    partner("Đại Ngãi", 9.733_924_226, 106.077_938_4),
    partner("Trần Đề", 9.528_517_406, 106.204_857_6),
    partner("Sóc Trăng", 9.606_109_64, 105.968_393_5),
    partner("Long Phú", 9.613_412_21, 106.151_422_7),
    partner("An Lạc Tây", 9.853_617_387, 105.979_050_5),
    partner("Mỹ Hòa", 10.222_672_05, 106.345_405_5),
    partner("Rạch Giá", 10.012_150_53, 105.084_060_4),
    partner("Xẻo Rô", 9.864_172_99, 105.112_946_6),
    partner("Gò Quao", 9.722_549_732, 105.277_408_9),
    partner("An Ninh", 9.871_961_46, 105.124_514_6),
    partner("Phước Long", 9.437_217_74, 105.460_973_3),
    partner("Gành Hào", 9.032_165_591, 105.418_343_7),
    partner("Cà Mau", 9.171_865_534, 105.149_739_1),
    partner("Sông Đốc", 9.040_111_339, 104.833_619_1),
    partner("Vũng Liêm", 10.083_550_46, 106.232_920_4),
    partner("Chù Chí", 9.303_196_225, 105.318_965),
    partner("Bạc Liêu", 9.281_556_339, 105.721_231_2),
    partner("Thới Bình", 9.347_981_4, 105.086_886_6),
    partner("Luyến Quỳnh", 10.168_072_24, 104.946_604_3),
    partner("Măng Thít", 10.161_495_61, 106.156_228_1),
    partner("Tám Ngàn", 10.321_05, 104.842_066_7),
];

/// Normalize a station name for comparison: accents folded (`Trà Vinh`
/// matches `Tra Vinh`), lowercase, letters and digits only.
#[must_use]
pub fn norm_name(name: &str) -> String {
    name.nfkd()
        .filter(|&c| !is_combining_mark(c))
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find a catalog station by name, ignoring case, accents, spacing and
/// punctuation.
#[must_use]
pub fn find_station(name: &str) -> Option<&'static Station> {
    let key = norm_name(name);
    STATIONS.iter().find(|s| norm_name(s.name) == key)
}
