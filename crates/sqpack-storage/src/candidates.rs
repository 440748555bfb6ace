//! Candidate path generators
//!
//! Lazy producers for the name spaces that can be enumerated exhaustively.
//! The resolver treats every generator as an opaque sequence of strings.

/// Lowercase letters
pub const LOWERCASE: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Lowercase letters, digits and `_`
pub const LOWERCASE_DIGITS_UNDERSCORE: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '_',
];

/// Highest icon number tried by [`ui_icons`]
pub const MAX_ICON_ID: u32 = 150_000;

const MAP_REGIONS: [&str; 3] = ["default", "region", "world"];
const MAP_SIZES: [&str; 2] = ["m", "s"];
const MAP_VARIANTS: [&str; 5] = ["_m", "_s", "d", "m_m", "m_s"];

/// Icon textures: `ui/icon/NNN000[/hq]/NNNNNN.tex` for every id up to [`MAX_ICON_ID`]
pub fn ui_icons() -> impl Iterator<Item = String> {
    (0..=MAX_ICON_ID).flat_map(|id| {
        let file = format!("{id:06}");
        let directory = format!("{:0<6}", &file[..3]);
        ["", "/hq"]
            .into_iter()
            .map(move |hq| format!("ui/icon/{directory}{hq}/{file}.tex"))
    })
}

/// Loading screen images: `ui/loadingimage/-nowloading_base{,01..99}.tex`
pub fn loading_images() -> impl Iterator<Item = String> {
    (0..=99u32).map(|i| {
        if i == 0 {
            "ui/loadingimage/-nowloading_base.tex".to_string()
        } else {
            format!("ui/loadingimage/-nowloading_base{i:02}.tex")
        }
    })
}

/// Map textures
///
/// First the named region maps (`ui/map/world/00/world00_m.tex`), then every
/// 4-character map code of the form `[a-z][0-9a-z][a-z][0-9a-z]` with each
/// two-digit number and texture variant.
pub fn map_textures() -> impl Iterator<Item = String> {
    let named = MAP_REGIONS.into_iter().flat_map(|word| {
        (0..=99u32).flat_map(move |i| {
            MAP_SIZES
                .into_iter()
                .map(move |size| format!("ui/map/{word}/{i:02}/{word}{i:02}_{size}.tex"))
        })
    });

    let codes = map_codes().flat_map(|code| {
        (0..=99u32).flat_map(move |i| {
            let code = code.clone();
            MAP_VARIANTS
                .into_iter()
                .map(move |variant| format!("ui/map/{code}/{i:02}/{code}{i:02}{variant}.tex"))
        })
    });

    named.chain(codes)
}

fn map_codes() -> impl Iterator<Item = String> {
    let digits_letters = || ('0'..='9').chain('a'..='z');
    ('a'..='z').flat_map(move |first| {
        digits_letters().flat_map(move |second| {
            ('a'..='z').flat_map(move |third| {
                digits_letters().map(move |fourth| [first, second, third, fourth].iter().collect())
            })
        })
    })
}

/// Every string of exactly `length` characters drawn from `alphabet`
///
/// Ordered like an odometer with the last character changing fastest.
pub fn alphabet_names(alphabet: &[char], length: usize) -> AlphabetNames {
    AlphabetNames {
        alphabet: alphabet.to_vec(),
        indices: vec![0; length],
        done: alphabet.is_empty() && length > 0,
    }
}

/// Iterator returned by [`alphabet_names`]
#[derive(Debug, Clone)]
pub struct AlphabetNames {
    alphabet: Vec<char>,
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for AlphabetNames {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        let name = self.indices.iter().map(|&i| self.alphabet[i]).collect();

        // Advance the odometer; wrapping past the first position ends the run
        self.done = true;
        for index in self.indices.iter_mut().rev() {
            *index += 1;
            if *index < self.alphabet.len() {
                self.done = false;
                break;
            }
            *index = 0;
        }

        Some(name)
    }
}
