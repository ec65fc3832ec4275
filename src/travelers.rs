// Traveler composition for a booking party

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelerClass {
    Adult,
    Child,
    Infant,
}

impl TravelerClass {
    pub const ALL: [TravelerClass; 3] = [Self::Adult, Self::Child, Self::Infant];

    // Lowest count a decrement can reach
    pub fn minimum(self) -> u32 {
        match self {
            TravelerClass::Adult => 1,
            TravelerClass::Child | TravelerClass::Infant => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TravelerComposition {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Default for TravelerComposition {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

impl TravelerComposition {
    pub fn new(adults: u32, children: u32, infants: u32) -> Self {
        Self {
            adults,
            children,
            infants,
        }
    }

    pub fn count(&self, class: TravelerClass) -> u32 {
        match class {
            TravelerClass::Adult => self.adults,
            TravelerClass::Child => self.children,
            TravelerClass::Infant => self.infants,
        }
    }

    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants
    }

    // A party can only be priced with at least one adult
    pub fn is_quotable(&self) -> bool {
        self.adults >= TravelerClass::Adult.minimum()
    }

    pub fn incremented(mut self, class: TravelerClass) -> Self {
        let slot = self.slot_mut(class);
        *slot = slot.saturating_add(1);
        self
    }

    // Decrements floor at the class minimum instead of producing an unquotable party
    pub fn decremented(mut self, class: TravelerClass) -> Self {
        let slot = self.slot_mut(class);
        if *slot > class.minimum() {
            *slot -= 1;
        }
        self
    }

    fn slot_mut(&mut self, class: TravelerClass) -> &mut u32 {
        match class {
            TravelerClass::Adult => &mut self.adults,
            TravelerClass::Child => &mut self.children,
            TravelerClass::Infant => &mut self.infants,
        }
    }
}
