use rust_decimal::Decimal;

use crate::domain::submission::{
    BusinessDetails, PersonalDetails, PropertyDetails, VehicleDetails,
};
use crate::validate::{allowed_phone, well_formed_email, FieldFailure, QuoteFormRules};

/// Raw text input for the personal-details screen. Parsing yields the typed
/// record or the full list of inline failures.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonalForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    touched: bool,
}

impl PersonalForm {
    pub fn parse(&self) -> Result<PersonalDetails, Vec<FieldFailure>> {
        let mut failures = Vec::new();

        if self.first_name.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "firstName" });
        }
        if self.last_name.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "lastName" });
        }
        if self.email.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "email" });
        } else if !well_formed_email(&self.email) {
            failures.push(FieldFailure::InvalidEmail { field: "email" });
        }
        if self.phone.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "phone" });
        } else if !allowed_phone(&self.phone) {
            failures.push(FieldFailure::InvalidCharacters { field: "phone" });
        }

        if !failures.is_empty() {
            return Err(failures);
        }

        Ok(PersonalDetails {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        })
    }

    pub fn mark_all_touched(&mut self) {
        self.touched = true;
    }

    pub fn touched(&self) -> bool {
        self.touched
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyForm {
    pub address: String,
    pub value: String,
    touched: bool,
}

impl PropertyForm {
    pub fn parse(&self, rules: &QuoteFormRules) -> Result<PropertyDetails, Vec<FieldFailure>> {
        let mut failures = Vec::new();

        if self.address.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "propertyAddress" });
        }

        let value = if self.value.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "propertyValue" });
            None
        } else {
            match self.value.trim().parse::<Decimal>() {
                Ok(value) if value < rules.minimum_property_value => {
                    failures.push(FieldFailure::BelowMinimum {
                        field: "propertyValue",
                        minimum: rules.minimum_property_value.to_string(),
                    });
                    None
                }
                Ok(value) => Some(value),
                Err(_) => {
                    failures.push(FieldFailure::NotANumber { field: "propertyValue" });
                    None
                }
            }
        };

        match (failures.is_empty(), value) {
            (true, Some(value)) => {
                Ok(PropertyDetails { address: self.address.trim().to_string(), value })
            }
            _ => Err(failures),
        }
    }

    pub fn mark_all_touched(&mut self) {
        self.touched = true;
    }

    pub fn touched(&self) -> bool {
        self.touched
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VehicleForm {
    pub make: String,
    pub model: String,
    pub year: String,
    touched: bool,
}

impl VehicleForm {
    pub fn parse(&self, rules: &QuoteFormRules) -> Result<VehicleDetails, Vec<FieldFailure>> {
        let mut failures = Vec::new();

        if self.make.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "vehicleMake" });
        }
        if self.model.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "vehicleModel" });
        }

        let year = if self.year.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "vehicleYear" });
            None
        } else {
            match self.year.trim().parse::<i32>() {
                Ok(year) if year < rules.minimum_vehicle_year => {
                    failures.push(FieldFailure::BelowMinimum {
                        field: "vehicleYear",
                        minimum: rules.minimum_vehicle_year.to_string(),
                    });
                    None
                }
                Ok(year) if year > rules.maximum_vehicle_year => {
                    failures.push(FieldFailure::AboveMaximum {
                        field: "vehicleYear",
                        maximum: rules.maximum_vehicle_year.to_string(),
                    });
                    None
                }
                Ok(year) => Some(year),
                Err(_) => {
                    failures.push(FieldFailure::NotANumber { field: "vehicleYear" });
                    None
                }
            }
        };

        match (failures.is_empty(), year) {
            (true, Some(year)) => Ok(VehicleDetails {
                make: self.make.trim().to_string(),
                model: self.model.trim().to_string(),
                year,
            }),
            _ => Err(failures),
        }
    }

    pub fn mark_all_touched(&mut self) {
        self.touched = true;
    }

    pub fn touched(&self) -> bool {
        self.touched
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BusinessForm {
    pub name: String,
    pub industry: String,
    pub employee_count: String,
    touched: bool,
}

impl BusinessForm {
    pub fn parse(&self, rules: &QuoteFormRules) -> Result<BusinessDetails, Vec<FieldFailure>> {
        let mut failures = Vec::new();

        if self.name.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "businessName" });
        }
        if self.industry.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "industry" });
        }

        let employee_count = if self.employee_count.trim().is_empty() {
            failures.push(FieldFailure::MissingValue { field: "numEmployees" });
            None
        } else {
            match self.employee_count.trim().parse::<u32>() {
                Ok(count) if count < rules.minimum_employee_count => {
                    failures.push(FieldFailure::BelowMinimum {
                        field: "numEmployees",
                        minimum: rules.minimum_employee_count.to_string(),
                    });
                    None
                }
                Ok(count) => Some(count),
                Err(_) => {
                    failures.push(FieldFailure::NotANumber { field: "numEmployees" });
                    None
                }
            }
        };

        match (failures.is_empty(), employee_count) {
            (true, Some(employee_count)) => Ok(BusinessDetails {
                name: self.name.trim().to_string(),
                industry: self.industry.trim().to_string(),
                employee_count,
            }),
            _ => Err(failures),
        }
    }

    pub fn mark_all_touched(&mut self) {
        self.touched = true;
    }

    pub fn touched(&self) -> bool {
        self.touched
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
