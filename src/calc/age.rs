use serde::Serialize;
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PetAge {
    pub years: u32,
    pub months: u32,
}

/// Completed years and months between `birth_date` and `today`.
pub fn pet_age(birth_date: Date, today: Date) -> Option<PetAge> {
    if birth_date > today {
        return None;
    }
    let mut months = (today.year() - birth_date.year()) * 12
        + (today.month() as i32 - birth_date.month() as i32);
    if today.day() < birth_date.day() {
        months -= 1;
    }
    let months = u32::try_from(months.max(0)).ok()?;
    Some(PetAge {
        years: months / 12,
        months: months % 12,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn counts_completed_months() {
        let age = pet_age(date!(2020 - 03 - 15), date!(2024 - 05 - 14)).unwrap();
        assert_eq!(age, PetAge { years: 4, months: 1 });
    }

    #[test]
    fn birthday_completes_the_year() {
        let age = pet_age(date!(2021 - 06 - 01), date!(2024 - 06 - 01)).unwrap();
        assert_eq!(age, PetAge { years: 3, months: 0 });
    }

    #[test]
    fn newborn_is_zero() {
        let age = pet_age(date!(2024 - 06 - 10), date!(2024 - 06 - 20)).unwrap();
        assert_eq!(age, PetAge { years: 0, months: 0 });
    }

    #[test]
    fn future_birth_date_has_no_age() {
        assert_eq!(pet_age(date!(2030 - 01 - 01), date!(2024 - 01 - 01)), None);
    }
}
