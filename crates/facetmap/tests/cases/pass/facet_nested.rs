// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use facetmap::{Facet, Projector, Reflect};

#[derive(Reflect, Debug, Clone)]
pub struct Address {
    pub city: String,
    pub street: String
}

#[derive(Reflect, Debug, Clone)]
pub struct Employee {
    pub name: String,
    pub salary: u32,
    pub address: Option<Box<Address>>,
    pub manager: Option<Box<Employee>>,
    pub reports: Vec<Employee>
}

#[derive(Facet, Debug)]
#[facet(source = "Address")]
pub struct AddressDto {
    pub city: String
}

#[derive(Facet, Debug)]
#[facet(source = "Employee", max_depth = 2)]
pub struct EmployeeDto {
    pub name: String,
    #[facet(nested)]
    pub address: Option<AddressDto>,
    #[facet(nested)]
    pub manager: Option<Box<EmployeeDto>>,
    #[facet(nested)]
    pub reports: Vec<EmployeeDto>
}

#[derive(Facet, Debug)]
#[facet(source = "Employee", name = "EmployeeRow")]
pub struct EmployeeRow {
    #[facet(from = "name")]
    pub label: String,
    #[facet(flatten = "address.city")]
    pub city: Option<String>
}

fn main() {
    let projector = Projector::builder()
        .facet::<EmployeeDto>()
        .facet::<EmployeeRow>()
        .build()
        .unwrap();

    let employee = Employee {
        name: "Bob".into(),
        salary: 10,
        address: Some(Box::new(Address {
            city: "Oslo".into(),
            street: "Main".into()
        })),
        manager: None,
        reports: Vec::new()
    };

    let dto: EmployeeDto = projector.project_as(&employee).unwrap();
    assert_eq!(dto.name, "Bob");
    assert_eq!(dto.address.map(|a| a.city).as_deref(), Some("Oslo"));

    let row: EmployeeRow = projector.project_as(&employee).unwrap();
    assert_eq!(row.label, "Bob");
    assert_eq!(row.city.as_deref(), Some("Oslo"));

    assert_eq!(<EmployeeRow as Facet>::spec().name, "EmployeeRow");
}
