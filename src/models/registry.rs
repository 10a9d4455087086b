//! Static kernel registry.
//!
//! One entry per theory function that may appear in a theory block: full name,
//! abbreviation, number of physical parameters and the parameter comment used
//! when tidying a block. Lookups are case-insensitive on name or abbreviation.

/// Every kernel kind the tree can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    Const,
    Asymmetry,
    SimpleExp,
    GeneralExp,
    SimpleGauss,
    StaticGaussKt,
    StaticGaussKtLf,
    DynamicGaussKtLf,
    StaticLorentzKt,
    StaticLorentzKtLf,
    DynamicLorentzKtLf,
    CombiLgKt,
    StrKt,
    SpinGlass,
    RandomAnisotropicHyperfine,
    Abragam,
    InternalField,
    InternalFieldGk,
    InternalFieldLl,
    TfCos,
    Bessel,
    InternalBessel,
    SkewedGauss,
    StaticNkZf,
    StaticNkTf,
    DynamicNkZf,
    DynamicNkTf,
    MuMinusExpTf,
    FMuF,
    Polynom,
    UserFcn,
}

/// Parameter-count rule of a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// `n` physical parameters, optionally followed by a time shift.
    Fixed(usize),
    /// At least `n` tokens, no upper bound.
    AtLeast(usize),
}

impl Arity {
    pub fn min(self) -> usize {
        match self {
            Arity::Fixed(n) | Arity::AtLeast(n) => n,
        }
    }

    /// True if `count` parameter tokens are acceptable.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => count == n || count == n + 1,
            Arity::AtLeast(n) => count >= n,
        }
    }

    /// Human-readable form for error messages.
    pub fn describe(self) -> String {
        match self {
            Arity::Fixed(n) => format!("{n} or {}", n + 1),
            Arity::AtLeast(n) => format!("at least {n}"),
        }
    }
}

/// Registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelInfo {
    pub kind: KernelKind,
    pub name: &'static str,
    pub abbrev: &'static str,
    pub arity: Arity,
    /// Backed by a numerically computed table rather than a closed form.
    pub tabulated: bool,
    pub comment: &'static str,
}

impl KernelInfo {
    /// The parameter comment for a line that carries a trailing time shift.
    pub fn comment_with_tshift(&self) -> String {
        match self.comment.strip_suffix(')') {
            Some(head) => format!("{head} tshift)"),
            None => self.comment.to_string(),
        }
    }
}

const fn entry(
    kind: KernelKind,
    name: &'static str,
    abbrev: &'static str,
    arity: usize,
    comment: &'static str,
) -> KernelInfo {
    KernelInfo {
        kind,
        name,
        abbrev,
        arity: Arity::Fixed(arity),
        tabulated: false,
        comment,
    }
}

const fn tabulated(
    kind: KernelKind,
    name: &'static str,
    abbrev: &'static str,
    arity: usize,
    comment: &'static str,
) -> KernelInfo {
    KernelInfo {
        tabulated: true,
        ..entry(kind, name, abbrev, arity, comment)
    }
}

static KERNELS: [KernelInfo; 31] = [
    entry(KernelKind::Const, "const", "c", 1, "(const)"),
    entry(KernelKind::Asymmetry, "asymmetry", "a", 1, "(asymmetry)"),
    entry(KernelKind::SimpleExp, "simplExpo", "se", 1, "(rate)"),
    entry(KernelKind::GeneralExp, "generExpo", "ge", 2, "(rate exponent)"),
    entry(KernelKind::SimpleGauss, "simpleGss", "sg", 1, "(rate)"),
    entry(KernelKind::StaticGaussKt, "statGssKT", "stg", 1, "(rate)"),
    tabulated(KernelKind::StaticGaussKtLf, "statGssKTLF", "sgktlf", 2, "(frequency damping)"),
    tabulated(
        KernelKind::DynamicGaussKtLf,
        "dynGssKTLF",
        "dgktlf",
        3,
        "(frequency damping hopping-rate)",
    ),
    entry(KernelKind::StaticLorentzKt, "statExpKT", "sekt", 1, "(rate)"),
    tabulated(KernelKind::StaticLorentzKtLf, "statExpKTLF", "sektlf", 2, "(frequency damping)"),
    tabulated(
        KernelKind::DynamicLorentzKtLf,
        "dynExpKTLF",
        "dektlf",
        3,
        "(frequency damping hopping-rate)",
    ),
    entry(KernelKind::CombiLgKt, "combiLGKT", "lgkt", 2, "(lorentzRate gaussRate)"),
    entry(KernelKind::StrKt, "strKT", "skt", 2, "(rate beta)"),
    entry(KernelKind::SpinGlass, "spinGlass", "spg", 3, "(rate hopprate order)"),
    entry(KernelKind::RandomAnisotropicHyperfine, "rdAnisoHf", "rahf", 2, "(frequency rate)"),
    entry(KernelKind::Abragam, "abragam", "ab", 2, "(rate hopprate)"),
    entry(
        KernelKind::InternalField,
        "internFld",
        "if",
        5,
        "(fraction phase frequency Trate Lrate)",
    ),
    entry(
        KernelKind::InternalFieldGk,
        "internFldGK",
        "ifgk",
        5,
        "(fraction frequency sigma lambda beta)",
    ),
    entry(
        KernelKind::InternalFieldLl,
        "internFldLL",
        "ifll",
        4,
        "(fraction frequency a lambda)",
    ),
    entry(KernelKind::TfCos, "TFieldCos", "tf", 2, "(phase frequency)"),
    entry(KernelKind::Bessel, "bessel", "b", 2, "(phase frequency)"),
    entry(
        KernelKind::InternalBessel,
        "internBsl",
        "ib",
        5,
        "(fraction phase frequency Trate Lrate)",
    ),
    entry(KernelKind::SkewedGauss, "skewedGss", "skg", 4, "(phase frequency rate_m rate_p)"),
    entry(KernelKind::StaticNkZf, "staticNKZF", "snkzf", 2, "(damping_D0 R_b)"),
    entry(
        KernelKind::StaticNkTf,
        "staticNKTF",
        "snktf",
        4,
        "(phase frequency damping_D0 R_b)",
    ),
    entry(KernelKind::DynamicNkZf, "dynamicNKZF", "dnkzf", 3, "(damping_D0 R_b nu_c)"),
    entry(
        KernelKind::DynamicNkTf,
        "dynamicNKTF",
        "dnktf",
        5,
        "(phase frequency damping_D0 R_b nu_c)",
    ),
    entry(
        KernelKind::MuMinusExpTf,
        "muMinusExpTF",
        "mmsetf",
        6,
        "(N0 tau A lambda phase nu)",
    ),
    entry(KernelKind::FMuF, "F_mu_F", "fmuf", 1, "(dipolar_frequency)"),
    KernelInfo {
        kind: KernelKind::Polynom,
        name: "polynom",
        abbrev: "p",
        arity: Arity::AtLeast(2),
        tabulated: false,
        comment: "(tshift p0 p1 ... pn)",
    },
    KernelInfo {
        kind: KernelKind::UserFcn,
        name: "userFcn",
        abbrev: "u",
        arity: Arity::AtLeast(2),
        tabulated: false,
        comment: "(lib fcn_name param_1 param_2 ... param_n)",
    },
];

/// All registered kernels in listing order.
pub fn kernel_table() -> &'static [KernelInfo] {
    &KERNELS
}

/// Case-insensitive lookup by full name or abbreviation.
pub fn search(name: &str) -> Option<&'static KernelInfo> {
    KERNELS
        .iter()
        .find(|k| k.name.eq_ignore_ascii_case(name) || k.abbrev.eq_ignore_ascii_case(name))
}

impl KernelKind {
    /// Registry entry of this kind; the table is ordered like the enum.
    pub fn info(self) -> &'static KernelInfo {
        &KERNELS[self as usize]
    }
}
