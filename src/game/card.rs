use serde::Deserialize;
use serde::Serialize;

const RANKS: &[u8; 13] = b"23456789TJQKA";
const SUITS: &[u8; 4] = b"cdhs";

/// A board card, packed as its position in a sorted deck.
///
/// rank = n / 4, suit = n % 4, so `0` is the 2c and `51` is the As.
/// The search never inspects card semantics; cards exist so that spots
/// hash distinctly across boards and render legibly.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card(u8);

impl Card {
    pub fn rank(&self) -> u8 {
        self.0 / 4
    }
    pub fn suit(&self) -> u8 {
        self.0 % 4
    }
}

impl From<u8> for Card {
    fn from(n: u8) -> Self {
        assert!(n < 52, "card index out of deck: {}", n);
        Self(n)
    }
}
impl From<Card> for u8 {
    fn from(c: Card) -> Self {
        c.0
    }
}

impl TryFrom<&str> for Card {
    type Error = anyhow::Error;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut chars = s.bytes();
        let r = chars.next().map(|c| c.to_ascii_uppercase());
        let s = chars.next().map(|c| c.to_ascii_lowercase());
        match (
            r.and_then(|r| RANKS.iter().position(|x| *x == r)),
            s.and_then(|s| SUITS.iter().position(|x| *x == s)),
        ) {
            (Some(rank), Some(suit)) => Ok(Self((rank * 4 + suit) as u8)),
            _ => Err(anyhow::anyhow!("unparseable card")),
        }
    }
}
impl TryFrom<String> for Card {
    type Error = anyhow::Error;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_from(s.as_str())
    }
}
impl From<Card> for String {
    fn from(c: Card) -> Self {
        c.to_string()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            RANKS[self.rank() as usize] as char,
            SUITS[self.suit() as usize] as char
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_str() {
        for text in ["As", "2c", "Td", "9h"] {
            let card = Card::try_from(text).unwrap();
            assert!(card.to_string() == text);
            assert!(card == Card::from(u8::from(card)));
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(Card::try_from("Xx").is_err());
        assert!(Card::try_from("A").is_err());
    }
}
