//! Jaeger near-vision scale
//!
//! J1 is the smallest print (best acuity). Read at a fixed short distance,
//! so sizing converts typographic points directly instead of using arc angles.

use super::lines::ChartLine;
use rand::Rng;

/// Standard reading distance for the near test
pub const JAEGER_DISTANCE_CM: u32 = 40;
pub const JAEGER_DISTANCE_M: f64 = 0.4;

/// One line of the Jaeger chart
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JaegerLine {
    pub ordinal: u8,
    pub jaeger: &'static str,
    pub point_size: f64,
    pub snellen_near: &'static str,
    pub log_mar: f64,
    pub description: &'static str,
}

impl ChartLine for JaegerLine {
    fn log_mar(&self) -> f64 {
        self.log_mar
    }

    fn label(&self) -> &'static str {
        self.jaeger
    }
}

pub const JAEGER_LINES: [JaegerLine; 10] = [
    JaegerLine { ordinal: 1, jaeger: "J1", point_size: 3.0, snellen_near: "20/20", log_mar: 0.0, description: "Very small print" },
    JaegerLine { ordinal: 2, jaeger: "J2", point_size: 4.0, snellen_near: "20/25", log_mar: 0.1, description: "Small print" },
    JaegerLine { ordinal: 3, jaeger: "J3", point_size: 5.0, snellen_near: "20/32", log_mar: 0.2, description: "Newspaper print" },
    JaegerLine { ordinal: 4, jaeger: "J4", point_size: 6.0, snellen_near: "20/40", log_mar: 0.3, description: "Book print" },
    JaegerLine { ordinal: 5, jaeger: "J5", point_size: 7.0, snellen_near: "20/50", log_mar: 0.4, description: "Magazine print" },
    JaegerLine { ordinal: 6, jaeger: "J6", point_size: 8.0, snellen_near: "20/63", log_mar: 0.5, description: "Medium print" },
    JaegerLine { ordinal: 7, jaeger: "J7", point_size: 10.0, snellen_near: "20/80", log_mar: 0.6, description: "Large print" },
    JaegerLine { ordinal: 8, jaeger: "J8", point_size: 12.0, snellen_near: "20/100", log_mar: 0.7, description: "Very large print" },
    JaegerLine { ordinal: 9, jaeger: "J10", point_size: 14.0, snellen_near: "20/125", log_mar: 0.8, description: "Heading" },
    JaegerLine { ordinal: 10, jaeger: "J12", point_size: 18.0, snellen_near: "20/160", log_mar: 0.9, description: "Headline" },
];

/// Language of the reading passages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextLocale {
    English,
    Portuguese,
}

impl TextLocale {
    /// Portuguese for any `pt*` locale tag, English otherwise
    pub fn from_tag(tag: &str) -> Self {
        if tag.to_ascii_lowercase().starts_with("pt") {
            TextLocale::Portuguese
        } else {
            TextLocale::English
        }
    }

    pub fn texts(&self) -> &'static [&'static str] {
        match self {
            TextLocale::English => &JAEGER_TEXTS_EN,
            TextLocale::Portuguese => &JAEGER_TEXTS_PT,
        }
    }
}

/// Passages of similar length with no ambiguous words
pub const JAEGER_TEXTS_EN: [&str; 10] = [
    "The sun rises on the horizon bringing a new day full of hope.",
    "The moon shines in the night sky while the stars twinkle around.",
    "The bird flies high over the mountains covered with white snow.",
    "The river runs calm between the rocks carrying leaves on its way.",
    "The rain falls softly on the roof making a peaceful sound.",
    "The wind blows strong swaying the trees in the flowering garden.",
    "The cat sleeps lazily on the couch warmed by the afternoon sun.",
    "The dog runs happily through the park playing with its ball.",
    "The flower blooms in spring showing its vibrant colors.",
    "The blue sea reflects the sky creating a spectacle of beauty.",
];

pub const JAEGER_TEXTS_PT: [&str; 10] = [
    "O sol nasce no horizonte trazendo um novo dia cheio de esperança.",
    "A lua brilha no céu noturno enquanto as estrelas cintilam ao redor.",
    "O pássaro voa alto sobre as montanhas cobertas de neve branca.",
    "O rio corre calmo entre as pedras levando folhas em seu caminho.",
    "A chuva cai suave sobre o telhado fazendo um som tranquilo.",
    "O vento sopra forte balançando as árvores do jardim florido.",
    "O gato dorme preguiçoso no sofá aquecido pelo sol da tarde.",
    "O cachorro corre feliz pelo parque brincando com sua bola.",
    "A flor desabrocha na primavera mostrando suas cores vibrantes.",
    "O mar azul reflete o céu criando um espetáculo de beleza.",
];

/// Random passage for `locale`, never the same as `avoid_last`
pub fn random_text<R: Rng + ?Sized>(
    locale: TextLocale,
    avoid_last: Option<&str>,
    rng: &mut R,
) -> &'static str {
    let texts = locale.texts();
    let exclude = avoid_last.and_then(|last| texts.iter().find(|t| **t == last));
    super::generator::next_symbol(texts, exclude, rng).unwrap_or(texts[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_lines_ordered_by_size() {
        for pair in JAEGER_LINES.windows(2) {
            assert!(pair[0].point_size < pair[1].point_size);
            assert!(pair[0].log_mar < pair[1].log_mar);
        }
    }

    #[test]
    fn test_locale_tag() {
        assert_eq!(TextLocale::from_tag("pt-BR"), TextLocale::Portuguese);
        assert_eq!(TextLocale::from_tag("en-US"), TextLocale::English);
        assert_eq!(TextLocale::from_tag(""), TextLocale::English);
    }

    #[test]
    fn test_random_text_avoids_last() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut last = random_text(TextLocale::English, None, &mut rng);
        for _ in 0..100 {
            let next = random_text(TextLocale::English, Some(last), &mut rng);
            assert_ne!(next, last);
            assert!(JAEGER_TEXTS_EN.contains(&next));
            last = next;
        }
    }
}
