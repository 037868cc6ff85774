use crate::error::LevelError;
use crate::grid::Grid;

pub const LEVEL_COUNT: u32 = 3;

const CLASSIC: [&str; 31] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##### ## #####.######",
    "######.##          ##.######",
    "######.## ###--### ##.######",
    "######.## #------# ##.######",
    "      .   #--G---#   .      ",
    "######.## #------# ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......P .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

const CROSSROADS: [&str; 15] = [
    "#####################",
    "#o.......#.#.......o#",
    "#.###.##.#.#.##.###.#",
    "#...................#",
    "#.###.#.#####.#.###.#",
    "#.....#... ...#.....#",
    "#####.#### ####.#####",
    "#####.####-####.#####",
    "     . #--G--# .     ",
    "#####.#########.#####",
    "#.........P.........#",
    "#.###.#.#####.#.###.#",
    "#o..#...........#..o#",
    "#...................#",
    "#####################",
];

const ARENA: [&str; 11] = [
    "###############",
    "#o...........o#",
    "#.##.#####.##.#",
    "#.............#",
    "#.#.#--G--#.#.#",
    "#.#.#######.#.#",
    "#.............#",
    "#.##.##P##.##.#",
    "#.............#",
    "#o...........o#",
    "###############",
];

pub fn level_layout(level: u32) -> Option<&'static [&'static str]> {
    match level {
        1 => Some(&CLASSIC[..]),
        2 => Some(&CROSSROADS[..]),
        3 => Some(&ARENA[..]),
        _ => None,
    }
}

pub fn load_level(level: u32) -> Result<Grid, LevelError> {
    let layout = level_layout(level).ok_or(LevelError::UnknownLevel(level))?;
    Grid::from_rows(layout)
}
