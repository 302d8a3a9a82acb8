//! Application sections reachable from the navigation menu.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    // Staff
    Sales,
    Catalog,
    Categories,
    Users,
    Orders,
    Providers,
    StockAlerts,
    Reports,
    // Customer
    Profile,
    MyOrders,
}

impl Section {
    pub fn id(&self) -> &'static str {
        match self {
            Section::Sales => "sales",
            Section::Catalog => "catalog",
            Section::Categories => "categories",
            Section::Users => "users",
            Section::Orders => "orders",
            Section::Providers => "providers",
            Section::StockAlerts => "stock-alerts",
            Section::Reports => "reports",
            Section::Profile => "profile",
            Section::MyOrders => "my-orders",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::Sales => "Ventas",
            Section::Catalog => "Productos",
            Section::Categories => "Categorías",
            Section::Users => "Usuarios",
            Section::Orders => "Pedidos",
            Section::Providers => "Proveedores",
            Section::StockAlerts => "Alertas de stock",
            Section::Reports => "Reportes",
            Section::Profile => "Mi Perfil",
            Section::MyOrders => "Mis Pedidos",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
