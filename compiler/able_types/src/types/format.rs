//! Type formatting for error messages.

use std::fmt;

use super::{FunctionType, Type};

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => f.write_str(kind.as_str()),
            Type::Integer(suffix) => f.write_str(suffix.as_str()),
            Type::Float(suffix) => f.write_str(suffix.as_str()),
            Type::TypeParameter(name) => f.write_str(name),
            Type::Struct(st) => f.write_str(&st.name),
            Type::StructInstance(inst) => {
                f.write_str(&inst.name)?;
                if inst.type_args.is_empty() {
                    Ok(())
                } else {
                    write_args(f, &inst.type_args)
                }
            }
            Type::Interface(iface) => f.write_str(&iface.name),
            Type::Union(un) => f.write_str(&un.name),
            Type::Package(pkg) => write!(f, "package {}", pkg.name),
            Type::Function(fn_type) => write!(f, "{fn_type}"),
            Type::Proc(inner) => write!(f, "Proc<{inner}>"),
            Type::Future(inner) => write!(f, "Future<{inner}>"),
            Type::Array(inner) => write!(f, "Array<{inner}>"),
            Type::Range(inner) => write!(f, "Range<{inner}>"),
            Type::Nullable(inner) => write!(f, "{inner}?"),
            Type::Applied { base, args } => {
                write!(f, "{base}")?;
                write_args(f, args)
            }
            Type::UnionLiteral(members) => {
                f.write_str("Union[")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str("]")
            }
            Type::Unknown => f.write_str("Unknown"),
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Type]) -> fmt::Result {
    f.write_str("<")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(">")
}

/// Render an interface name with its arguments: `Iterable<Array<i32>>`.
pub fn interface_label(name: &str, args: &[Type]) -> String {
    if args.is_empty() {
        name.to_string()
    } else {
        let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
        format!("{name}<{}>", rendered.join(", "))
    }
}
