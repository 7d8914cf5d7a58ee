use std::fmt;

use thirtyfour::By;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Id,
    XPath,
    ClassName,
    Css,
}

/// Immutable (strategy, value) pair identifying zero or more elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locator {
    strategy: Strategy,
    value: &'static str,
}

impl Locator {
    #[must_use]
    pub const fn id(value: &'static str) -> Self {
        Self {
            strategy: Strategy::Id,
            value,
        }
    }

    #[must_use]
    pub const fn xpath(value: &'static str) -> Self {
        Self {
            strategy: Strategy::XPath,
            value,
        }
    }

    #[must_use]
    pub const fn class_name(value: &'static str) -> Self {
        Self {
            strategy: Strategy::ClassName,
            value,
        }
    }

    #[must_use]
    pub const fn css(value: &'static str) -> Self {
        Self {
            strategy: Strategy::Css,
            value,
        }
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[must_use]
    pub const fn value(&self) -> &'static str {
        self.value
    }

    pub fn to_by(&self) -> By {
        match self.strategy {
            Strategy::Id => By::Id(self.value),
            Strategy::XPath => By::XPath(self.value),
            Strategy::ClassName => By::ClassName(self.value),
            Strategy::Css => By::Css(self.value),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.strategy {
            Strategy::Id => "By.id",
            Strategy::XPath => "By.xpath",
            Strategy::ClassName => "By.className",
            Strategy::Css => "By.cssSelector",
        };
        write!(f, "{prefix}: {}", self.value)
    }
}
