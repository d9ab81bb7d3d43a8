//! Degrees/minutes/seconds to decimal degrees.

use std::{fmt::Display, str::FromStr};

use crate::{utility::dms, Error};

/// Cardinal direction attached to a DMS angle. South and West give negative
/// decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Returns `-1.0` for [`Direction::South`] and [`Direction::West`],
    /// `1.0` otherwise.
    pub fn sign(self) -> f64 {
        match self {
            Direction::North | Direction::East => 1.,
            Direction::South | Direction::West => -1.,
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase() {
            'N' => Ok(Direction::North),
            'S' => Ok(Direction::South),
            'E' => Ok(Direction::East),
            // Ouest
            'W' | 'O' => Ok(Direction::West),
            _ => Err(Error::InvalidCoord(format!("Unknown direction {value:?}, expected one of N, S, E, W"))),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Direction::try_from(c),
            _ => Err(Error::InvalidCoord(format!("Unknown direction {s:?}, expected one of N, S, E, W"))),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            Direction::North => 'N',
            Direction::South => 'S',
            Direction::East => 'E',
            Direction::West => 'W',
        };
        write!(f, "{c}")
    }
}

/// Converts a degrees/minutes/seconds angle to decimal degrees.
///
/// The three parts are magnitudes; the sign comes from `direction` only.
/// Values are not range checked.
///
/// # Usage
///
/// ```
/// use geoscale::angle::{to_decimal_degrees, Direction};
///
/// let lat = to_decimal_degrees(36., 30., 35.05, Direction::North);
/// assert!((lat - 36.509736111).abs() < 1e-6);
///
/// let lat = to_decimal_degrees(36., 30., 35.05, Direction::South);
/// assert!((lat + 36.509736111).abs() < 1e-6);
/// ```
pub fn to_decimal_degrees(degrees: f64, minutes: f64, seconds: f64, direction: Direction) -> f64 {
    let dd = degrees + minutes / f64::from(dms::DM) + seconds / f64::from(dms::DS);

    direction.sign() * dd
}

/// A degrees/minutes/seconds angle with its direction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dms {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
    pub direction: Direction,
}

impl Dms {
    pub fn new(degrees: f64, minutes: f64, seconds: f64, direction: Direction) -> Dms {
        Self {
            degrees,
            minutes,
            seconds,
            direction,
        }
    }

    /// Returns the angle in decimal degrees, see [`to_decimal_degrees`].
    pub fn to_decimal(&self) -> f64 {
        to_decimal_degrees(self.degrees, self.minutes, self.seconds, self.direction)
    }
}

/// Parses `D,M,S,H` (comma or whitespace separated), e.g. `36,30,35.05,N`
/// or `1 18 15.87 E`.
impl FromStr for Dms {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>();

        let [degrees, minutes, seconds, direction] = parts.as_slice() else {
            return Err(Error::InvalidCoord(format!("Expected degrees, minutes, seconds and direction in {s:?}")));
        };

        let number = |part: &str| {
            part.parse::<f64>()
                .map_err(|_| Error::InvalidCoord(format!("{part:?} is not a number in {s:?}")))
        };

        Ok(Dms::new(
            number(*degrees)?,
            number(*minutes)?,
            number(*seconds)?,
            direction.parse()?,
        ))
    }
}
