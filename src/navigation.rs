//! Stateless navigation through a menu
//!
//! Where the user currently is in the meal → course hierarchy lives entirely
//! in a [`NavigationToken`] that the front-end hands back on every selection.
//! The token is `DATE`, `DATE.MEAL`, or `DATE.MEAL.COURSE`; decoding it
//! re-resolves the menu for that date instead of trusting anything captured
//! when the token was minted.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::data::{Course, DateKey, Meal, Menu, MenuResolver};
use crate::error::MenuError;

const SEPARATOR: char = '.';

/// Stands in for an empty label, which would otherwise be an empty segment
const EMPTY_LABEL: &str = "%00";

/// Errors that can occur when decoding a selection
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Wrong number of segments or a bad escape
    #[error("Invalid selection token '{0}'")]
    InvalidToken(String),

    /// The date segment is not a valid date
    #[error(transparent)]
    InvalidDate(MenuError),

    /// The menu for the token's date could not be resolved
    #[error("Menu unavailable: {0}")]
    MenuUnavailable(#[source] MenuError),

    /// The meal no longer exists in the resolved menu
    #[error("No meal '{meal}' on {date}")]
    UnknownMeal { date: DateKey, meal: String },

    /// The course no longer exists within the meal
    #[error("No course '{course}' in {meal} on {date}")]
    UnknownCourse {
        date: DateKey,
        meal: String,
        course: String,
    },
}

impl NavigationError {
    /// Wording suitable for showing to an end user
    pub fn user_message(&self) -> &'static str {
        match self {
            NavigationError::InvalidToken(_) => "That selection is not valid.",
            NavigationError::InvalidDate(err) | NavigationError::MenuUnavailable(err) => {
                err.user_message()
            }
            NavigationError::UnknownMeal { .. } | NavigationError::UnknownCourse { .. } => {
                "This menu is no longer available."
            }
        }
    }
}

/// A path into the hierarchy for one date
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NavigationToken {
    /// Every meal served on the date
    Root(DateKey),
    /// The courses of one meal
    Meal(DateKey, String),
    /// The items of one course within a meal
    Course(DateKey, String, String),
}

impl NavigationToken {
    /// Builds a token from optional meal and course labels
    ///
    /// A course without a meal addresses nothing, so it is dropped.
    pub fn new(date: DateKey, meal: Option<&str>, course: Option<&str>) -> Self {
        match (meal, course) {
            (Some(meal), Some(course)) => Self::Course(date, meal.to_string(), course.to_string()),
            (Some(meal), None) => Self::Meal(date, meal.to_string()),
            (None, _) => Self::Root(date),
        }
    }

    pub fn date(&self) -> DateKey {
        match self {
            Self::Root(date) | Self::Meal(date, _) | Self::Course(date, _, _) => *date,
        }
    }

    /// The token one level below this one, `None` below a course
    pub fn child(&self, label: &str) -> Option<Self> {
        match self {
            Self::Root(date) => Some(Self::Meal(*date, label.to_string())),
            Self::Meal(date, meal) => Some(Self::Course(*date, meal.clone(), label.to_string())),
            Self::Course(..) => None,
        }
    }

    /// Resolves the token against a freshly resolved menu
    pub async fn decode(&self, resolver: &MenuResolver) -> Result<View, NavigationError> {
        let date = self.date();
        let menu = resolver
            .resolve(date)
            .await
            .map_err(NavigationError::MenuUnavailable)?;
        self.narrow(menu)
    }

    /// Narrows a menu to the node this token addresses
    pub fn narrow(&self, menu: Menu) -> Result<View, NavigationError> {
        let (date, meal_label, course_label) = match self {
            Self::Root(date) => return Ok(View::Root { date: *date, menu }),
            Self::Meal(date, meal) => (*date, meal, None),
            Self::Course(date, meal, course) => (*date, meal, Some(course)),
        };

        let meal = menu
            .meals
            .into_iter()
            .find(|m| &m.label == meal_label)
            .ok_or_else(|| NavigationError::UnknownMeal {
                date,
                meal: meal_label.clone(),
            })?;

        let Some(course_label) = course_label else {
            return Ok(View::Meal { date, meal });
        };

        let course = meal
            .courses
            .into_iter()
            .find(|c| &c.label == course_label)
            .ok_or_else(|| NavigationError::UnknownCourse {
                date,
                meal: meal_label.clone(),
                course: course_label.clone(),
            })?;

        Ok(View::Course {
            date,
            meal_label: meal_label.clone(),
            course,
        })
    }
}

/// Encodes a token string for a date and optional labels
pub fn encode(date: DateKey, meal: Option<&str>, course: Option<&str>) -> String {
    NavigationToken::new(date, meal, course).to_string()
}

/// Parses and resolves a token string in one step
pub async fn decode(token: &str, resolver: &MenuResolver) -> Result<View, NavigationError> {
    token.parse::<NavigationToken>()?.decode(resolver).await
}

impl fmt::Display for NavigationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root(date) => write!(f, "{}", date),
            Self::Meal(date, meal) => write!(f, "{}{}{}", date, SEPARATOR, escape(meal)),
            Self::Course(date, meal, course) => write!(
                f,
                "{}{sep}{}{sep}{}",
                date,
                escape(meal),
                escape(course),
                sep = SEPARATOR
            ),
        }
    }
}

impl FromStr for NavigationToken {
    type Err = NavigationError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || NavigationError::InvalidToken(token.to_string());
        let segments: Vec<&str> = token.split(SEPARATOR).collect();
        if segments.len() > 3 || segments.iter().skip(1).any(|s| s.is_empty()) {
            return Err(invalid());
        }

        let date = DateKey::parse(segments[0]).map_err(NavigationError::InvalidDate)?;
        let labels = segments[1..]
            .iter()
            .map(|s| unescape(s).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match labels.as_slice() {
            [] => Self::Root(date),
            [meal] => Self::Meal(date, meal.clone()),
            [meal, course] => Self::Course(date, meal.clone(), course.clone()),
            _ => return Err(invalid()),
        })
    }
}

/// `%` and `.` are the only characters that cannot appear raw in a segment
fn escape(label: &str) -> String {
    if label.is_empty() {
        return EMPTY_LABEL.to_string();
    }
    label.replace('%', "%25").replace('.', "%2E")
}

fn unescape(segment: &str) -> Option<String> {
    if segment == EMPTY_LABEL {
        return Some(String::new());
    }
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let code = rest.get(pos + 1..pos + 3)?;
        match code.to_ascii_uppercase().as_str() {
            "25" => out.push('%'),
            "2E" => out.push('.'),
            _ => return None,
        }
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    Some(out)
}

/// The node a token addresses, ready for the front-end to render
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Root { date: DateKey, menu: Menu },
    Meal { date: DateKey, meal: Meal },
    Course {
        date: DateKey,
        meal_label: String,
        course: Course,
    },
}

impl View {
    pub fn date(&self) -> DateKey {
        match self {
            View::Root { date, .. } | View::Meal { date, .. } | View::Course { date, .. } => *date,
        }
    }

    /// The token that addresses this view
    pub fn token(&self) -> NavigationToken {
        match self {
            View::Root { date, .. } => NavigationToken::Root(*date),
            View::Meal { date, meal } => NavigationToken::Meal(*date, meal.label.clone()),
            View::Course {
                date,
                meal_label,
                course,
            } => NavigationToken::Course(*date, meal_label.clone(), course.label.clone()),
        }
    }

    /// Labels the user can select next; empty at course level
    pub fn children(&self) -> Vec<&str> {
        match self {
            View::Root { menu, .. } => menu.meal_labels().collect(),
            View::Meal { meal, .. } => meal.course_labels().collect(),
            View::Course { .. } => Vec::new(),
        }
    }

    /// Mints the token for selecting `label` from this view
    pub fn child_token(&self, label: &str) -> Option<String> {
        self.token().child(label).map(|token| token.to_string())
    }
}
