//! Precomputed sunrise and sunset times
//!
//! The lamp does not compute solar positions. It reads a table of
//! 366 `(sunrise, sunset)` minute-of-day pairs, one per day of a leap year.

/// Number of entries in a solar table
pub const TABLE_LEN: usize = 366;

/// Largest valid table index
pub const LAST_INDEX: usize = TABLE_LEN - 1;

/// Raw table layout: `[sunrise_minute, sunset_minute]` per day
pub type SolarData = [[u16; 2]; TABLE_LEN];

/// Sunrise and sunset of one day as minutes after local midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarMinutes {
    pub sunrise: u16,
    pub sunset: u16,
}

impl SolarMinutes {
    pub const fn new(sunrise: u16, sunset: u16) -> Self {
        Self { sunrise, sunset }
    }
}

/// Read-only lookup over a compiled-in [`SolarData`] table
#[derive(Debug, Clone, Copy)]
pub struct SolarTable {
    data: &'static SolarData,
}

impl SolarTable {
    pub const fn new(data: &'static SolarData) -> Self {
        Self { data }
    }

    /// Entry at a zero-based index.
    ///
    /// Indices past the end read the last entry.
    pub const fn lookup(&self, index: usize) -> SolarMinutes {
        let index = if index > LAST_INDEX { LAST_INDEX } else { index };
        let [sunrise, sunset] = self.data[index];
        SolarMinutes { sunrise, sunset }
    }
}

impl Default for SolarTable {
    fn default() -> Self {
        Self::new(&AMSTERDAM)
    }
}

/// Amsterdam (52.37N, 4.90E), local time, summer time from March 31st
/// to October 27th (2024 calendar).
pub static AMSTERDAM: SolarData = [
    [530, 997], [530, 998], [530, 999], [530, 1000], [529, 1001], [529, 1002], [529, 1004], [528, 1005],
    [528, 1006], [527, 1008], [526, 1009], [526, 1011], [525, 1012], [524, 1014], [523, 1015], [522, 1017],
    [521, 1018], [520, 1020], [519, 1022], [518, 1023], [517, 1025], [516, 1027], [515, 1029], [514, 1030],
    [512, 1032], [511, 1034], [510, 1036], [508, 1038], [507, 1039], [505, 1041], [504, 1043], [502, 1045],
    [501, 1047], [499, 1049], [497, 1051], [496, 1053], [494, 1055], [492, 1056], [491, 1058], [489, 1060],
    [487, 1062], [485, 1064], [483, 1066], [481, 1068], [479, 1070], [478, 1072], [476, 1074], [474, 1076],
    [472, 1078], [470, 1079], [467, 1081], [465, 1083], [463, 1085], [461, 1087], [459, 1089], [457, 1091],
    [455, 1093], [453, 1094], [451, 1096], [448, 1098], [446, 1100], [444, 1102], [442, 1104], [439, 1105],
    [437, 1107], [435, 1109], [433, 1111], [430, 1113], [428, 1114], [426, 1116], [423, 1118], [421, 1120],
    [419, 1122], [417, 1123], [414, 1125], [412, 1127], [410, 1129], [407, 1130], [405, 1132], [402, 1134],
    [400, 1136], [398, 1137], [395, 1139], [393, 1141], [391, 1143], [388, 1144], [386, 1146], [384, 1148],
    [381, 1149], [379, 1151], [437, 1213], [434, 1215], [432, 1216], [430, 1218], [427, 1220], [425, 1221],
    [423, 1223], [420, 1225], [418, 1226], [416, 1228], [413, 1230], [411, 1232], [409, 1233], [407, 1235],
    [404, 1237], [402, 1238], [400, 1240], [398, 1242], [396, 1244], [393, 1245], [391, 1247], [389, 1249],
    [387, 1250], [385, 1252], [383, 1254], [381, 1256], [379, 1257], [377, 1259], [375, 1261], [373, 1262],
    [371, 1264], [369, 1266], [367, 1267], [365, 1269], [363, 1271], [361, 1272], [359, 1274], [358, 1276],
    [356, 1277], [354, 1279], [352, 1281], [351, 1282], [349, 1284], [347, 1286], [346, 1287], [344, 1289],
    [343, 1290], [341, 1292], [340, 1293], [338, 1295], [337, 1296], [336, 1298], [334, 1299], [333, 1301],
    [332, 1302], [331, 1303], [330, 1305], [329, 1306], [328, 1307], [327, 1309], [326, 1310], [325, 1311],
    [324, 1312], [323, 1313], [322, 1314], [322, 1315], [321, 1316], [320, 1317], [320, 1318], [319, 1319],
    [319, 1320], [318, 1321], [318, 1321], [318, 1322], [318, 1323], [317, 1323], [317, 1324], [317, 1324],
    [317, 1325], [317, 1325], [317, 1326], [317, 1326], [318, 1326], [318, 1326], [318, 1327], [319, 1327],
    [319, 1327], [319, 1327], [320, 1327], [320, 1326], [321, 1326], [322, 1326], [322, 1326], [323, 1325],
    [324, 1325], [325, 1325], [326, 1324], [327, 1323], [327, 1323], [328, 1322], [330, 1321], [331, 1321],
    [332, 1320], [333, 1319], [334, 1318], [335, 1317], [336, 1316], [338, 1315], [339, 1314], [340, 1313],
    [342, 1312], [343, 1311], [344, 1309], [346, 1308], [347, 1307], [349, 1305], [350, 1304], [352, 1302],
    [353, 1301], [355, 1299], [356, 1298], [358, 1296], [359, 1295], [361, 1293], [362, 1291], [364, 1289],
    [366, 1288], [367, 1286], [369, 1284], [370, 1282], [372, 1280], [374, 1279], [375, 1277], [377, 1275],
    [379, 1273], [380, 1271], [382, 1269], [383, 1267], [385, 1265], [387, 1263], [388, 1261], [390, 1258],
    [392, 1256], [393, 1254], [395, 1252], [397, 1250], [398, 1248], [400, 1245], [402, 1243], [403, 1241],
    [405, 1239], [406, 1236], [408, 1234], [410, 1232], [411, 1230], [413, 1227], [415, 1225], [416, 1223],
    [418, 1220], [420, 1218], [421, 1216], [423, 1213], [424, 1211], [426, 1209], [428, 1206], [429, 1204],
    [431, 1201], [433, 1199], [434, 1197], [436, 1194], [437, 1192], [439, 1190], [441, 1187], [442, 1185],
    [444, 1182], [446, 1180], [447, 1178], [449, 1175], [451, 1173], [452, 1171], [454, 1168], [456, 1166],
    [457, 1163], [459, 1161], [461, 1159], [462, 1156], [464, 1154], [466, 1152], [467, 1149], [469, 1147],
    [471, 1145], [473, 1143], [474, 1140], [476, 1138], [478, 1136], [480, 1133], [481, 1131], [483, 1129],
    [485, 1127], [487, 1125], [488, 1122], [490, 1120], [492, 1118], [494, 1116], [496, 1114], [497, 1112],
    [499, 1110], [501, 1108], [503, 1106], [505, 1104], [447, 1042], [448, 1040], [450, 1038], [452, 1036],
    [454, 1034], [456, 1032], [458, 1030], [460, 1028], [461, 1027], [463, 1025], [465, 1023], [467, 1021],
    [469, 1020], [471, 1018], [473, 1017], [474, 1015], [476, 1013], [478, 1012], [480, 1010], [482, 1009],
    [483, 1008], [485, 1006], [487, 1005], [489, 1004], [490, 1002], [492, 1001], [494, 1000], [496, 999],
    [497, 998], [499, 997], [500, 996], [502, 995], [504, 994], [505, 993], [507, 993], [508, 992],
    [509, 991], [511, 991], [512, 990], [513, 989], [515, 989], [516, 989], [517, 988], [518, 988],
    [519, 988], [520, 987], [521, 987], [522, 987], [523, 987], [524, 987], [525, 987], [526, 988],
    [526, 988], [527, 988], [528, 988], [528, 989], [529, 989], [529, 990], [529, 990], [530, 991],
    [530, 992], [530, 992], [530, 993], [530, 994], [530, 995], [530, 996],
];
