use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::fmt;

/// How a method binds to its artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Associated function, no receiver.
    Static,
    /// `&self`
    Ref,
    /// `&mut self`
    Mut,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: TokenStream,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TokenStream) -> Self {
        Self { name: name.into(), ty }
    }
}

#[derive(Debug, Clone)]
pub struct MethodSpec {
    pub name: String,
    pub receiver: Receiver,
    pub params: Vec<Param>,
    pub ret: Option<TokenStream>,
    pub body: TokenStream,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>, receiver: Receiver) -> Self {
        Self {
            name: name.into(),
            receiver,
            params: Vec::new(),
            ret: None,
            body: TokenStream::new(),
        }
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, ty: TokenStream) -> Self {
        self.ret = Some(ty);
        self
    }

    pub fn with_body(mut self, body: TokenStream) -> Self {
        self.body = body;
        self
    }

    fn to_tokens(&self) -> TokenStream {
        let name = format_ident!("{}", self.name);
        let mut args = match self.receiver {
            Receiver::Static => TokenStream::new(),
            Receiver::Ref => quote! { &self },
            Receiver::Mut => quote! { &mut self },
        };
        for param in &self.params {
            if !args.is_empty() {
                args.extend(quote! { , });
            }
            let pname = format_ident!("{}", param.name);
            let ty = &param.ty;
            args.extend(quote! { #pname: #ty });
        }
        let ret = self.ret.as_ref().map(|ty| quote! { -> #ty });
        let body = &self.body;
        quote! {
            pub fn #name(#args) #ret {
                #body
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TokenStream,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: TokenStream) -> Self {
        Self { name: name.into(), ty }
    }
}

#[derive(Debug, Clone)]
pub struct ConstSpec {
    pub name: String,
    pub ty: TokenStream,
    pub value: TokenStream,
}

impl ConstSpec {
    pub fn new(name: impl Into<String>, ty: TokenStream, value: TokenStream) -> Self {
        Self { name: name.into(), ty, value }
    }
}

/// Description of one generated type: fields, associated constants, methods
/// and nested types. Rendering is a reference implementation; a real
/// backend may map the description to any target surface.
#[derive(Debug, Clone)]
pub struct ClassSpec {
    pub name: String,
    /// Interface the artifact implements, recorded for the backend.
    pub implements: Option<String>,
    pub fields: Vec<FieldSpec>,
    pub consts: Vec<ConstSpec>,
    pub methods: Vec<MethodSpec>,
    pub nested: Vec<ClassSpec>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implements: None,
            fields: Vec::new(),
            consts: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn implementing(mut self, interface: impl Into<String>) -> Self {
        self.implements = Some(interface.into());
        self
    }

    pub fn add_field(&mut self, field: FieldSpec) {
        self.fields.push(field);
    }

    pub fn add_const(&mut self, spec: ConstSpec) {
        self.consts.push(spec);
    }

    pub fn add_method(&mut self, method: MethodSpec) {
        self.methods.push(method);
    }

    pub fn add_nested(&mut self, class: ClassSpec) {
        self.nested.push(class);
    }

    pub fn to_token_stream(&self) -> TokenStream {
        let name = format_ident!("{}", self.name);
        let strukt = if self.fields.is_empty() {
            quote! { pub struct #name; }
        } else {
            let fields = self.fields.iter().map(|f| {
                let fname = format_ident!("{}", f.name);
                let ty = &f.ty;
                quote! { #fname: #ty, }
            });
            quote! {
                pub struct #name {
                    #(#fields)*
                }
            }
        };
        let consts = self.consts.iter().map(|c| {
            let cname = format_ident!("{}", c.name);
            let ty = &c.ty;
            let value = &c.value;
            quote! { pub const #cname: #ty = #value; }
        });
        let methods = self.methods.iter().map(MethodSpec::to_tokens);
        let nested = self.nested.iter().map(ClassSpec::to_token_stream);
        quote! {
            #strukt

            impl #name {
                #(#consts)*
                #(#methods)*
            }

            #(#nested)*
        }
    }
}

impl fmt::Display for ClassSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_token_stream())
    }
}

/// One generated artifact: a qualified name plus its type description.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub class: ClassSpec,
}

impl Artifact {
    pub fn new(name: impl Into<String>, class: ClassSpec) -> Self {
        Self { name: name.into(), class }
    }
}

/// Turns a `::`-separated qualified name into path tokens.
pub fn path_tokens(qualified: &str) -> TokenStream {
    let segments = qualified.split("::").map(|s| format_ident!("{}", s));
    quote! { #(#segments)::* }
}
